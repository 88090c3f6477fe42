//! The reader's status display as a trait.
//!
//! The deployed reader has a small panel (an LCD line and two LEDs) that
//! tells the person at the door what is happening.  This module models
//! that surface as a fire-and-forget event sink: the rest of the crate
//! raises coarse [`PanelEvent`]s and never learns how they are shown.
//!
//! Implementations:
//!
//! | Type                                    | Backing                      |
//! |-----------------------------------------|------------------------------|
//! | [`LogPanel`]                            | tracing log lines            |
//! | [`mock::RecordingPanel`]                | in-memory event list (tests) |
//!
//! Real panel hardware plugs in behind the same trait.  `render` takes
//! `&self` and the trait requires `Send + Sync` so one panel can be
//! shared via `Arc` between the connection manager and the scan loop.

use tracing::{info, warn};

pub mod mock;

/// One thing worth showing on the reader's panel.
///
/// The variants are the panel's whole vocabulary; anything not
/// expressible here does not belong on a door display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEvent {
    /// Startup connection sequence has begun.
    Connecting,
    /// One startup connection attempt is being made.
    ConnectAttempt { attempt: u32, max_attempts: u32 },
    /// The reader gave up on the authority and runs from the cache.
    OfflineMode,
    /// A background reconnect succeeded; authority decisions again.
    Reconnected,
    /// Idle hint that the reader is ready for a badge.
    Waiting { offline: bool },
    /// The door opens.
    AccessGranted,
    /// The door stays shut.
    AccessDenied,
    /// A roster push replaced the cached list.
    ListUpdated { count: usize },
}

/// A display surface for [`PanelEvent`]s.
///
/// Rendering must not block and cannot fail; a panel that loses an
/// event just shows the next one.
pub trait StatusPanel: Send + Sync {
    /// Shows one event.
    fn render(&self, event: PanelEvent);
}

/// Renders panel events as log lines.
///
/// The bench-test stand has no panel hardware; the operator reads the
/// service log instead.  Denials and offline transitions go to `warn`
/// so they stand out at the default filter level.
pub struct LogPanel;

impl StatusPanel for LogPanel {
    fn render(&self, event: PanelEvent) {
        match event {
            PanelEvent::Connecting => info!("connecting to authority"),
            PanelEvent::ConnectAttempt {
                attempt,
                max_attempts,
            } => info!("connection attempt {attempt} of {max_attempts}"),
            PanelEvent::OfflineMode => {
                warn!("OFFLINE mode: deciding from the cached badge list")
            }
            PanelEvent::Reconnected => info!("reconnected to authority; back ONLINE"),
            PanelEvent::Waiting { offline: true } => info!("waiting for badge (OFFLINE)"),
            PanelEvent::Waiting { offline: false } => info!("waiting for badge"),
            PanelEvent::AccessGranted => info!("access granted"),
            PanelEvent::AccessDenied => warn!("access denied"),
            PanelEvent::ListUpdated { count } => {
                info!("badge list updated from authority ({count} badge(s))")
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
