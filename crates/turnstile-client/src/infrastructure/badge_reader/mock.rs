//! Scripted badge reader for unit testing.
//!
//! # Why a scripted reader?
//!
//! The real scanner needs hardware and a human hand; the stdin reader
//! needs a terminal.  The `ScriptedBadgeReader` replays a fixed sequence
//! of badges, one per poll, so tests can script "Alice scans, then a
//! stranger scans" and assert on the resulting decisions.
//!
//! # Usage in tests
//!
//! ```ignore
//! let mut reader = ScriptedBadgeReader::from_ids(&["F39A370E", "XXXXXXXX"]);
//!
//! assert_eq!(reader.poll(), Some(BadgeId::new("F39A370E").unwrap()));
//! assert_eq!(reader.poll(), Some(BadgeId::new("XXXXXXXX").unwrap()));
//! assert_eq!(reader.poll(), None);
//! ```

use std::collections::VecDeque;

use turnstile_core::BadgeId;

use super::BadgeReader;

/// A reader that yields pre-loaded badges in order, then `None`.
#[derive(Default)]
pub struct ScriptedBadgeReader {
    queue: VecDeque<BadgeId>,
}

impl ScriptedBadgeReader {
    /// Creates an empty reader; add scans with [`ScriptedBadgeReader::push`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a reader pre-loaded with the given IDs.
    ///
    /// # Panics
    ///
    /// Panics if an ID is not a valid badge; the script is test code.
    pub fn from_ids(ids: &[&str]) -> Self {
        Self {
            queue: ids
                .iter()
                .map(|s| BadgeId::new(*s).expect("scripted badge id must be valid"))
                .collect(),
        }
    }

    /// Appends one more scan to the script.
    pub fn push(&mut self, badge: BadgeId) {
        self.queue.push_back(badge);
    }
}

impl BadgeReader for ScriptedBadgeReader {
    /// Pops the next scripted badge.
    fn poll(&mut self) -> Option<BadgeId> {
        self.queue.pop_front()
    }
}
