//! Turnstile door reader client — entry point.
//!
//! Wires together the authority connection, the cached badge list, the
//! scanner, and the status panel, then runs the scan loop until Ctrl+C.
//!
//! # Usage
//!
//! ```text
//! turnstile-client [OPTIONS]
//!
//! Options:
//!   --config <PATH>  Config file [default: client.toml]
//!   --host <HOST>    Override the authority host
//!   --port <PORT>    Override the authority port
//! ```
//!
//! On the bench there is no RFID hardware; badge IDs are typed one per
//! line on stdin and the panel is the service log.
//!
//! # Environment variable overrides
//!
//! CLI args take precedence when both are present.
//!
//! | Variable                    | Default       | Description      |
//! |-----------------------------|---------------|------------------|
//! | `TURNSTILE_CLIENT_CONFIG`   | `client.toml` | Config file path |
//! | `TURNSTILE_AUTHORITY_HOST`  | from config   | Authority host   |
//! | `TURNSTILE_AUTHORITY_PORT`  | from config   | Authority port   |
//!
//! # The scan loop (for beginners)
//!
//! One cooperative loop does everything, one turn at a time:
//!
//! ```text
//! loop:
//!   maintain()    -- reconnect if OFFLINE and the interval elapsed
//!   poll_push()   -- apply any roster push waiting on the socket
//!   poll reader   -- has a badge been presented?
//!     yes -> decide -> show granted/denied -> debounce pause
//!     no  -> short sleep, occasionally show a waiting hint
//! ```
//!
//! A single flow means a decision is never interleaved with a reconnect
//! attempt, which is exactly the guarantee the decision rules want.

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::time::{sleep, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

use turnstile_client::application::Authorizer;
use turnstile_client::infrastructure::badge_reader::{BadgeReader, StdinBadgeReader};
use turnstile_client::infrastructure::config::{load_config, ClientConfig, ReaderConfig};
use turnstile_client::infrastructure::network::{ConnectivityManager, Mode};
use turnstile_client::infrastructure::status_panel::{LogPanel, PanelEvent, StatusPanel};
use turnstile_client::infrastructure::store::LocalStore;
use turnstile_core::Decision;

/// How often the idle loop repeats the "waiting for badge" hint.
const WAITING_HINT_PERIOD: Duration = Duration::from_secs(10);

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Turnstile door reader client.
///
/// Checks scanned badges against the authority server when reachable
/// and against the cached local list when not.
#[derive(Debug, Parser)]
#[command(
    name = "turnstile-client",
    about = "Door reader: online badge checks with offline fallback",
    version
)]
struct Cli {
    /// Path to the TOML config file.
    ///
    /// An absent file is not an error; built-in defaults apply.
    #[arg(long, default_value = "client.toml", env = "TURNSTILE_CLIENT_CONFIG")]
    config: PathBuf,

    /// Override the authority host from the config.
    #[arg(long, env = "TURNSTILE_AUTHORITY_HOST")]
    host: Option<String>,

    /// Override the authority port from the config.
    #[arg(long, env = "TURNSTILE_AUTHORITY_PORT")]
    port: Option<u16>,
}

/// Loads the config file and applies CLI overrides on top.
fn resolve_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = load_config(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    if let Some(host) = &cli.host {
        config.authority.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.authority.port = port;
    }
    Ok(config)
}

// ── The scan loop ─────────────────────────────────────────────────────────────

/// Runs the reader until `running` is cleared.
async fn run_scan_loop(
    mut authorizer: Authorizer,
    mut reader: Box<dyn BadgeReader>,
    panel: Arc<dyn StatusPanel>,
    pacing: ReaderConfig,
    running: Arc<AtomicBool>,
) {
    let mut next_waiting_hint = Instant::now();

    while running.load(Ordering::Relaxed) {
        authorizer.maintain().await;
        authorizer.poll_push().await;

        match reader.poll() {
            Some(badge) => {
                info!("badge {badge} presented");
                let decision = authorizer.decide(&badge).await;
                panel.render(match decision {
                    Decision::Allow => PanelEvent::AccessGranted,
                    Decision::Deny => PanelEvent::AccessDenied,
                });
                // One presentation of a badge must not register twice.
                sleep(pacing.debounce()).await;
            }
            None => {
                if Instant::now() >= next_waiting_hint {
                    panel.render(PanelEvent::Waiting {
                        offline: authorizer.mode() == Mode::Offline,
                    });
                    next_waiting_hint = Instant::now() + WAITING_HINT_PERIOD;
                }
                sleep(pacing.poll_interval()).await;
            }
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    info!(
        "turnstile client starting; authority at {}",
        config.authority.display()
    );

    let panel: Arc<dyn StatusPanel> = Arc::new(LogPanel);
    let store = LocalStore::new(config.store.path.clone());

    // Startup connection sequence: a few bounded attempts, then accept
    // whichever mode we end up in.  Never fatal.
    let mut connectivity = ConnectivityManager::new(
        config.authority.clone(),
        config.connection.clone(),
        Arc::clone(&panel),
    );
    connectivity.connect_initial().await;

    let authorizer = Authorizer::new(connectivity, store, Arc::clone(&panel));
    info!(
        "{} badge(s) in the local cache; starting {}",
        authorizer.authorized_count(),
        authorizer.mode()
    );

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            running_clone.store(false, Ordering::Relaxed);
        }
    });

    let reader: Box<dyn BadgeReader> = Box::new(StdinBadgeReader::spawn());
    info!("reader ready; enter badge IDs one per line");

    run_scan_loop(authorizer, reader, panel, config.reader, running).await;

    info!("turnstile client stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
