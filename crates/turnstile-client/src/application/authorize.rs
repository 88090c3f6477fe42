//! Authorizer: decides one scanned badge.
//!
//! This use case sits at the application layer and drives three
//! collaborators: the [`ConnectivityManager`] for the authority link,
//! the [`LocalStore`] for the cached list, and a [`StatusPanel`] for the
//! one event it owns (`ListUpdated`).  The scan loop hands it a badge
//! and gets back exactly one [`Decision`], whatever the network does in
//! between.
//!
//! # The decision contract (for beginners)
//!
//! A door reader has one job: every presented badge gets one answer,
//! promptly.  That shapes everything here:
//!
//! - ONLINE, the authority answers.  Its reply is authoritative because
//!   only the authority knows the lock window.
//! - If the connection dies *mid-request*, the badge is not dropped and
//!   not retried over the network.  The reader goes OFFLINE and answers
//!   that same badge from the cached list immediately.  One scan, one
//!   decision.
//! - OFFLINE, the cached list is the whole truth: listed means allowed,
//!   everything else (including an empty cache) means denied.
//!
//! # Roster pushes
//!
//! The authority can send `UPDATE_LIST:…` at any moment.  Two windows
//! exist where one can arrive:
//!
//! 1. While we wait for an `ALLOW`/`DENY`.  The push is applied and the
//!    read continues; the pending decision still gets its answer.
//! 2. Between scans.  The scan loop calls [`Authorizer::poll_push`]
//!    every turn, which peeks at the link briefly and applies whatever
//!    arrived.
//!
//! Either way a push replaces the in-memory list *and* the on-disk
//! cache wholesale, and the panel shows the new count.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use turnstile_core::{AuthorityReply, BadgeId, Decision};

use crate::infrastructure::network::{ClientNetworkError, ConnectivityManager, Mode};
use crate::infrastructure::status_panel::{PanelEvent, StatusPanel};
use crate::infrastructure::store::LocalStore;

/// How long one `poll_push` turn listens for an unsolicited message.
///
/// Short enough that the scan loop's cadence is unaffected; pushes are
/// rare and another poll comes one loop turn later.
const PUSH_POLL_WINDOW: Duration = Duration::from_millis(10);

/// The badge decision use case.
pub struct Authorizer {
    connectivity: ConnectivityManager,
    store: LocalStore,
    /// The cached list, loaded once at startup and thereafter replaced
    /// only by roster pushes.  This set answers all OFFLINE decisions.
    badges: HashSet<BadgeId>,
    panel: Arc<dyn StatusPanel>,
}

impl Authorizer {
    /// Creates the use case and loads the cached list from `store`.
    pub fn new(
        connectivity: ConnectivityManager,
        store: LocalStore,
        panel: Arc<dyn StatusPanel>,
    ) -> Self {
        let badges = store.load();
        Self {
            connectivity,
            store,
            badges,
            panel,
        }
    }

    /// Current decision mode, for the scan loop's idle hint.
    pub fn mode(&self) -> Mode {
        self.connectivity.mode()
    }

    /// Size of the cached list.
    pub fn authorized_count(&self) -> usize {
        self.badges.len()
    }

    /// One turn of connection upkeep; see
    /// [`ConnectivityManager::maintain`].
    pub async fn maintain(&mut self) {
        self.connectivity.maintain().await;
    }

    /// Decides one scanned badge.  Always returns, always exactly once
    /// per scan.
    pub async fn decide(&mut self, badge: &BadgeId) -> Decision {
        let decision = if self.connectivity.is_online() {
            match self.online_decision(badge).await {
                Ok(decision) => decision,
                Err(e) => {
                    warn!("authority exchange failed ({e}); falling back to cached list");
                    self.connectivity.mark_offline();
                    self.local_decision(badge)
                }
            }
        } else {
            self.local_decision(badge)
        };

        info!(
            "badge {badge}: {decision} ({} mode)",
            self.connectivity.mode()
        );
        decision
    }

    /// Drains unsolicited roster pushes between scans.
    ///
    /// Applies every push already queued on the socket.  A dead link
    /// discovered here flips the reader OFFLINE exactly like a failure
    /// during a badge exchange.
    pub async fn poll_push(&mut self) {
        while self.connectivity.is_online() {
            let result = match self.connectivity.link_mut() {
                Some(link) => link.try_read_push(PUSH_POLL_WINDOW).await,
                None => return,
            };
            match result {
                Ok(Some(AuthorityReply::UpdateList(ids))) => self.apply_roster(ids),
                Ok(Some(reply)) => {
                    // A decision with no badge in flight has nothing to
                    // attach to; drop it rather than guess.
                    warn!("ignoring stray {} outside a badge exchange", reply.kind());
                    return;
                }
                Ok(None) => return,
                Err(e) => {
                    warn!("authority link lost between scans ({e})");
                    self.connectivity.mark_offline();
                    return;
                }
            }
        }
    }

    /// Runs one badge exchange against the live link.
    ///
    /// Replies are read until a decision arrives; `UPDATE_LIST` pushes
    /// that land in the middle are applied and the wait continues.
    async fn online_decision(
        &mut self,
        badge: &BadgeId,
    ) -> Result<Decision, ClientNetworkError> {
        self.connectivity
            .link_mut()
            .ok_or(ClientNetworkError::Closed)?
            .send_badge(badge)
            .await?;

        loop {
            let reply = self
                .connectivity
                .link_mut()
                .ok_or(ClientNetworkError::Closed)?
                .read_reply()
                .await?;
            match reply {
                AuthorityReply::Allow => return Ok(Decision::Allow),
                AuthorityReply::Deny => return Ok(Decision::Deny),
                AuthorityReply::UpdateList(ids) => self.apply_roster(ids),
            }
        }
    }

    /// Membership check against the cached list.
    fn local_decision(&self, badge: &BadgeId) -> Decision {
        if self.badges.contains(badge) {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }

    /// Replaces the cached list wholesale, in memory and on disk.
    fn apply_roster(&mut self, ids: Vec<BadgeId>) {
        self.badges = ids.into_iter().collect();
        self.store.save(&self.badges);
        info!("roster push applied: {} badge(s)", self.badges.len());
        self.panel.render(PanelEvent::ListUpdated {
            count: self.badges.len(),
        });
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
