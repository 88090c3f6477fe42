//! Mock status panel for unit testing.
//!
//! # Why a mock panel?
//!
//! The real panel is a piece of door hardware, and [`LogPanel`] only
//! produces log lines that test code cannot assert on.  The
//! `RecordingPanel` stores every rendered event in order so tests can
//! check exactly what the person at the door would have seen.
//!
//! # Usage in tests
//!
//! ```ignore
//! let panel = Arc::new(RecordingPanel::new());
//! let mut connectivity = ConnectivityManager::new(addr, timings, Arc::clone(&panel));
//!
//! connectivity.connect_initial().await;
//!
//! // The reader announced each attempt and then went offline.
//! assert!(panel.events().contains(&PanelEvent::OfflineMode));
//! ```

use std::sync::Mutex;

use super::{PanelEvent, StatusPanel};

/// A panel that records all events without displaying anything.
///
/// The event list sits behind a `Mutex` so tests can share the panel
/// across tasks via `Arc`.
#[derive(Default)]
pub struct RecordingPanel {
    events: Mutex<Vec<PanelEvent>>,
}

impl RecordingPanel {
    /// Creates a panel with an empty event list.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of everything rendered so far, oldest first.
    pub fn events(&self) -> Vec<PanelEvent> {
        self.events.lock().unwrap().clone()
    }

    /// How many times `event` was rendered.
    pub fn count_of(&self, event: &PanelEvent) -> usize {
        self.events.lock().unwrap().iter().filter(|e| *e == event).count()
    }
}

impl StatusPanel for RecordingPanel {
    /// Appends the event to the in-memory list.
    fn render(&self, event: PanelEvent) {
        self.events.lock().unwrap().push(event);
    }
}
