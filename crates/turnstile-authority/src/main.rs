//! Turnstile authority server — entry point.
//!
//! This binary holds the ground-truth badge roster and lock window,
//! answers badge checks from door readers over TCP, and gives the
//! operator a stdin console for lock-window changes and roster pushes.
//!
//! # Usage
//!
//! ```text
//! turnstile-authority [OPTIONS]
//!
//! Options:
//!   --config <PATH>  Config file [default: authority.toml]
//!   --bind <ADDR>    Override the configured bind address
//!   --port <PORT>    Override the configured port
//! ```
//!
//! A missing config file is fine: the server starts with an empty
//! (deny-all) roster on `0.0.0.0:5050` and the operator can still use
//! the console.
//!
//! # Environment variable overrides
//!
//! CLI args take precedence when both are present.
//!
//! | Variable                      | Default          | Description        |
//! |-------------------------------|------------------|--------------------|
//! | `TURNSTILE_AUTHORITY_CONFIG`  | `authority.toml` | Config file path   |
//! | `TURNSTILE_BIND`              | from config      | Bind address       |
//! | `TURNSTILE_PORT`              | from config      | Listen port        |
//!
//! # Architecture overview
//!
//! ```text
//! door readers  (badge ID / ALLOW / DENY / UPDATE_LIST over TCP)
//!       |
//! turnstile-authority  <- this process
//!   application/
//!     state.rs    shared roster + lock window + connected readers
//!     admin.rs    console command parsing
//!   infrastructure/
//!     network/    accept loop, one task per reader, broadcast
//!     console.rs  stdin thread + command dispatch
//!     config.rs   authority.toml
//! ```

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tokio::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use turnstile_authority::application::state::AuthorityState;
use turnstile_authority::infrastructure::config::{load_config, AuthorityConfig};
use turnstile_authority::infrastructure::console::{run_console, spawn_console_reader};
use turnstile_authority::infrastructure::network::run_listener;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Turnstile authority server.
///
/// Answers badge checks against the authorized roster and the
/// time-of-day lock window, and pushes roster updates to connected
/// readers on operator request.
#[derive(Debug, Parser)]
#[command(
    name = "turnstile-authority",
    about = "Badge authority: roster, lock window, and decisions over TCP",
    version
)]
struct Cli {
    /// Path to the TOML config file.
    ///
    /// An absent file is not an error; built-in defaults apply.
    #[arg(
        long,
        default_value = "authority.toml",
        env = "TURNSTILE_AUTHORITY_CONFIG"
    )]
    config: PathBuf,

    /// Override the bind address from the config (e.g. `127.0.0.1`).
    #[arg(long, env = "TURNSTILE_BIND")]
    bind: Option<String>,

    /// Override the listen port from the config.
    #[arg(long, env = "TURNSTILE_PORT")]
    port: Option<u16>,
}

/// Loads the config file and applies CLI overrides on top.
fn resolve_config(cli: &Cli) -> anyhow::Result<AuthorityConfig> {
    let mut config = load_config(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    if let Some(bind) = &cli.bind {
        config.listen.address = bind.clone();
    }
    if let Some(port) = cli.port {
        config.listen.port = port;
    }
    Ok(config)
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// Startup order:
///
/// 1. Logging (`RUST_LOG`, falling back to `info`).
/// 2. CLI parsing and config load.
/// 3. Build the shared [`AuthorityState`] from the configured roster and
///    lock bounds.
/// 4. Bind the listener.  This is the only fatal startup error; anything
///    later is handled and logged.
/// 5. Spawn the Ctrl+C handler and the operator console, then run the
///    accept loop until the shutdown flag is cleared by `exit` or
///    Ctrl+C.
/// 6. Drain open reader connections (each observes the flag within its
///    1 s read timeout) and stop.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    let bind_addr = config.listen.bind_addr();

    let state = Arc::new(AuthorityState::new(
        config.access.roster(),
        config.access.lock_bounds(),
    ));
    info!(
        "turnstile authority starting on {bind_addr} with {} badge(s) authorized",
        state.roster_snapshot().await.len()
    );

    // The one unrecoverable startup condition: the port is taken or
    // privileged.  Everything after this point degrades instead of dying.
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind listener on {bind_addr}"))?;

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C; initiating graceful shutdown");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    let console_lines = spawn_console_reader();
    let console_task = tokio::spawn(run_console(
        Arc::clone(&state),
        Arc::clone(&running),
        console_lines,
    ));

    run_listener(Arc::clone(&state), listener, Arc::clone(&running)).await;

    // Give connection tasks time to observe the flag and close.  Each
    // blocks at most one read timeout (1 s), so 3 s is generous.
    let drain_deadline = Instant::now() + Duration::from_secs(3);
    loop {
        let remaining = state.client_count().await;
        if remaining == 0 {
            break;
        }
        if Instant::now() >= drain_deadline {
            warn!("{remaining} reader connection(s) still open at shutdown");
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let _ = console_task.await;
    info!("turnstile authority stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
