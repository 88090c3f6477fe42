//! Shared authority state: the roster, the lock window, and the set of
//! connected readers.
//!
//! Every connection task, the broadcast path, and the operator console
//! all work against one [`AuthorityState`].  The three shared structures
//! each sit behind their own lock, and every method takes a guard only
//! long enough to snapshot or update, never across an I/O call.  That
//! discipline is what keeps a roster broadcast from observing a
//! half-mutated list and keeps `decide` wait-free in practice.
//!
//! The decision rule lives here too, because it is nothing without the
//! state it reads: the lock window is checked first and overrides
//! membership unconditionally, then the roster decides.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use turnstile_core::{BadgeId, DenyReason, LockWindow, TimeOfDay, Verdict};

/// The operator-settable lock window bounds.
///
/// The console sets start and end with separate commands, so one bound
/// can transiently exist without the other.  The window only takes
/// effect once both are present; [`LockBounds::window`] is the single
/// place that rule is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LockBounds {
    /// Start of the daily lock interval.
    pub start: Option<TimeOfDay>,
    /// End of the daily lock interval.
    pub end: Option<TimeOfDay>,
}

impl LockBounds {
    /// The effective window, present only when both bounds are set.
    pub fn window(&self) -> Option<LockWindow> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(LockWindow::new(start, end)),
            _ => None,
        }
    }
}

/// One connected reader, as seen by the broadcast path.
///
/// The write half is shared between the connection's own reply path and
/// roster broadcasts, so it sits behind an async mutex.  The read half
/// stays exclusively with the connection task.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    /// Peer address, for log lines and the status command.
    pub peer: SocketAddr,
    /// Shared write half of the connection.
    pub writer: Arc<Mutex<OwnedWriteHalf>>,
}

/// Ground-truth access state shared across the whole authority process.
///
/// Created once at startup from the config and handed around as
/// `Arc<AuthorityState>`.  Roster and lock mutations come only from the
/// operator console and live in memory for the process lifetime; there
/// is deliberately no persistence, a restart resets both.
pub struct AuthorityState {
    /// The authorized badge roster.
    authorized: RwLock<HashSet<BadgeId>>,
    /// Lock window bounds.
    lock: RwLock<LockBounds>,
    /// Currently connected readers, keyed by connection id.
    clients: Mutex<HashMap<Uuid, ClientHandle>>,
}

impl AuthorityState {
    /// Creates the state from an initial roster and lock bounds.
    pub fn new(roster: HashSet<BadgeId>, bounds: LockBounds) -> Self {
        Self {
            authorized: RwLock::new(roster),
            lock: RwLock::new(bounds),
            clients: Mutex::new(HashMap::new()),
        }
    }

    // ── Decisions ─────────────────────────────────────────────────────────────

    /// Whether the lock window covers `now`.
    ///
    /// Always `false` while either bound is unset.
    pub async fn is_locked(&self, now: TimeOfDay) -> bool {
        self.lock
            .read()
            .await
            .window()
            .is_some_and(|w| w.contains(now))
    }

    /// Decides one badge.
    ///
    /// The lock window is checked first and wins over membership: during
    /// the window every badge is denied, including ones on the roster.
    /// Outside the window the roster alone decides.
    pub async fn decide(&self, badge: &BadgeId, now: TimeOfDay) -> Verdict {
        if self.is_locked(now).await {
            return Verdict::Deny(DenyReason::LockWindowActive);
        }
        if self.authorized.read().await.contains(badge) {
            Verdict::Allow
        } else {
            Verdict::Deny(DenyReason::NotAuthorized)
        }
    }

    // ── Roster ────────────────────────────────────────────────────────────────

    /// A sorted snapshot of the roster, for broadcasts and the status
    /// command.  Sorting keeps wire payloads and console output stable.
    pub async fn roster_snapshot(&self) -> Vec<BadgeId> {
        let guard = self.authorized.read().await;
        let mut ids: Vec<BadgeId> = guard.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Replaces the roster wholesale.
    pub async fn replace_roster(&self, roster: HashSet<BadgeId>) {
        *self.authorized.write().await = roster;
    }

    // ── Lock window ───────────────────────────────────────────────────────────

    /// Sets the start bound of the lock window.
    pub async fn set_lock_start(&self, t: TimeOfDay) {
        self.lock.write().await.start = Some(t);
    }

    /// Sets the end bound of the lock window.
    pub async fn set_lock_end(&self, t: TimeOfDay) {
        self.lock.write().await.end = Some(t);
    }

    /// Clears both lock bounds.
    pub async fn clear_lock(&self) {
        *self.lock.write().await = LockBounds::default();
    }

    /// A snapshot of the current lock bounds.
    pub async fn lock_bounds(&self) -> LockBounds {
        *self.lock.read().await
    }

    // ── Connected readers ─────────────────────────────────────────────────────

    /// Registers a newly accepted connection.
    pub async fn register_client(&self, id: Uuid, handle: ClientHandle) {
        self.clients.lock().await.insert(id, handle);
    }

    /// Removes a connection; called on every exit path of a connection
    /// task and when a broadcast write fails.
    pub async fn unregister_client(&self, id: Uuid) {
        self.clients.lock().await.remove(&id);
    }

    /// Number of currently connected readers.
    pub async fn client_count(&self) -> usize {
        self.clients.lock().await.len()
    }

    /// A snapshot of all connected readers.
    ///
    /// The map guard is released before the caller does any socket I/O;
    /// only the cheap `Arc` clones leave this method.
    pub async fn client_handles(&self) -> Vec<(Uuid, ClientHandle)> {
        self.clients
            .lock()
            .await
            .iter()
            .map(|(id, handle)| (*id, handle.clone()))
            .collect()
    }
}

/// Reads the local wall clock as a [`TimeOfDay`].
///
/// Lives here rather than in `turnstile-core` so the shared crate stays
/// free of clock access; everything decision-related funnels through
/// this one function.
pub fn local_time_of_day() -> TimeOfDay {
    TimeOfDay::from(chrono::Local::now().time())
}
