//! The badge scanner as a trait.
//!
//! The deployed reader gets badge IDs from an RFID front end.  This
//! module models the scanner as a non-blocking poll so the scan loop can
//! interleave it with connection upkeep: one loop turn asks "has a badge
//! been presented since I last looked?" and moves on either way.
//!
//! Implementations:
//!
//! | Type                                    | Source                        |
//! |-----------------------------------------|-------------------------------|
//! | [`StdinBadgeReader`]                    | one badge per stdin line      |
//! | [`mock::ScriptedBadgeReader`]           | a pre-loaded queue (tests)    |
//!
//! The trait is defined in the infrastructure layer because it is a
//! hardware-facing adapter; the scan loop drives it as `dyn BadgeReader`.

use std::sync::mpsc::{self, Receiver, TryRecvError};

use tracing::{debug, error};

use turnstile_core::BadgeId;

pub mod mock;

/// A source of scanned badges.
pub trait BadgeReader: Send {
    /// Returns the next scanned badge, or `None` when nothing has been
    /// presented since the previous poll.  Must not block.
    fn poll(&mut self) -> Option<BadgeId>;
}

/// Reads badge IDs typed one per line on stdin.
///
/// Stands in for the RFID front end on the bench: the blocking
/// `read_line` lives on its own thread and hands finished lines over a
/// channel, so [`poll`](BadgeReader::poll) stays non-blocking.  Blank
/// lines are ignored.  On EOF the thread ends and the reader simply
/// never yields another badge.
pub struct StdinBadgeReader {
    scans: Receiver<BadgeId>,
}

impl StdinBadgeReader {
    /// Spawns the stdin thread and returns the reader.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();

        // The thread blocks in read_line between scans, so it cannot be
        // joined on shutdown; it dies with the process.
        let spawned = std::thread::Builder::new()
            .name("badge-stdin".to_string())
            .spawn(move || {
                let stdin = std::io::stdin();
                let mut line = String::new();
                loop {
                    line.clear();
                    match stdin.read_line(&mut line) {
                        Ok(0) | Err(_) => break,
                        Ok(_) => {}
                    }
                    let badge = match BadgeId::new(&line) {
                        Ok(badge) => badge,
                        Err(_) => {
                            debug!("ignoring blank scan line");
                            continue;
                        }
                    };
                    if tx.send(badge).is_err() {
                        break;
                    }
                }
            });
        if let Err(e) = spawned {
            error!("could not start badge-stdin thread: {e}");
        }

        Self { scans: rx }
    }
}

impl BadgeReader for StdinBadgeReader {
    fn poll(&mut self) -> Option<BadgeId> {
        match self.scans.try_recv() {
            Ok(badge) => Some(badge),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
