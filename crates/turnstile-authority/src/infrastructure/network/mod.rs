//! TCP listener and per-reader connection handling.
//!
//! This module is responsible for:
//!
//! 1. Accepting reader connections on the configured address.
//! 2. Running one Tokio task per connection: read a badge request,
//!    decide it against [`AuthorityState`], write the reply.
//! 3. Broadcasting `UPDATE_LIST:` roster pushes to every connected
//!    reader on behalf of the operator console.
//! 4. Shutting down promptly when the shared `running` flag is cleared.
//!
//! # Shutdown behaviour
//!
//! Nothing here blocks indefinitely.  The accept loop wraps `accept()`
//! in a 200 ms timeout and each connection task wraps its socket read in
//! a 1 s timeout, so every task observes a cleared `running` flag within
//! one timeout period.  Binding the listener is the caller's job (and
//! the only fatal startup error in the whole server); per-connection
//! failures merely end that connection.
//!
//! # Locking
//!
//! Shared state guards are taken only to snapshot or update, never
//! across socket I/O.  The one mutex held across a write is each
//! connection's own writer mutex, which exists precisely to serialise
//! the reply path with roster broadcasts on the same socket.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::application::state::{local_time_of_day, AuthorityState, ClientHandle};
use turnstile_core::{
    decode_request, encode_reply, AuthorityReply, BadgeId, ProtocolError, TimeOfDay, Verdict,
    MAX_MESSAGE_BYTES,
};

/// How long a connection task waits on its socket before re-checking the
/// shutdown flag.
const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// How long the accept loop waits before re-checking the shutdown flag.
const ACCEPT_POLL: Duration = Duration::from_millis(200);

// ── Accept loop ───────────────────────────────────────────────────────────────

/// Runs the accept loop until `running` is cleared.
///
/// Each accepted connection is handed to its own Tokio task so a slow
/// reader never delays the others.  The listener socket closes when this
/// function returns and drops it.
pub async fn run_listener(
    state: Arc<AuthorityState>,
    listener: TcpListener,
    running: Arc<AtomicBool>,
) {
    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping accept loop");
            break;
        }

        // Short timeout so the loop can re-check `running` even when no
        // reader is connecting.
        match timeout(ACCEPT_POLL, listener.accept()).await {
            Ok(Ok((stream, peer))) => {
                info!("reader connected from {peer}");
                let state = Arc::clone(&state);
                let running = Arc::clone(&running);
                tokio::spawn(async move {
                    handle_connection(state, stream, peer, running).await;
                });
            }
            Ok(Err(e)) => {
                // Transient accept error (e.g. out of file descriptors).
                // Keep serving the readers that are already connected.
                error!("accept error: {e}");
            }
            Err(_) => {
                // Timeout tick; loop back to check the flag.
            }
        }
    }
}

// ── Per-connection handler ────────────────────────────────────────────────────

/// Top-level handler for one reader connection.
///
/// Registers the connection in the shared client set, wraps
/// [`serve_reader`] to log the outcome, and always unregisters on the
/// way out.  The outer/inner pair keeps `?` available inside
/// `serve_reader` while the bookkeeping stays in one place.
async fn handle_connection(
    state: Arc<AuthorityState>,
    stream: tokio::net::TcpStream,
    peer: SocketAddr,
    running: Arc<AtomicBool>,
) {
    let conn_id = Uuid::new_v4();
    let (read_half, write_half) = stream.into_split();
    let writer = Arc::new(Mutex::new(write_half));

    state
        .register_client(
            conn_id,
            ClientHandle {
                peer,
                writer: Arc::clone(&writer),
            },
        )
        .await;
    debug!("reader {peer} registered as {conn_id}");

    match serve_reader(&state, read_half, &writer, peer, &running).await {
        Ok(()) => info!("reader {peer} disconnected"),
        Err(e) => warn!("reader {peer} connection ended with error: {e:#}"),
    }

    state.unregister_client(conn_id).await;
}

/// Request/reply loop for one reader.
///
/// Returns `Ok` on a clean close (zero-length read) or on shutdown, and
/// an error for I/O failures and for requests that are not even UTF-8.
/// An *empty* badge after trimming gets a plain `DENY`, the same answer
/// any unknown badge gets, and the connection stays up.
async fn serve_reader(
    state: &AuthorityState,
    mut read_half: OwnedReadHalf,
    writer: &Mutex<OwnedWriteHalf>,
    peer: SocketAddr,
    running: &AtomicBool,
) -> anyhow::Result<()> {
    let mut buf = vec![0u8; MAX_MESSAGE_BYTES];

    while running.load(Ordering::Relaxed) {
        let n = match timeout(READ_TIMEOUT, read_half.read(&mut buf)).await {
            // No scan within the timeout; loop to observe shutdown.
            Err(_) => continue,
            // Zero-length read: the reader closed its end.
            Ok(Ok(0)) => return Ok(()),
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(e).context("read from reader failed"),
        };

        let reply = match decode_request(&buf[..n]) {
            Ok(badge) => {
                let now = local_time_of_day();
                let verdict = state.decide(&badge, now).await;
                log_attempt(&badge, peer, now, verdict);
                AuthorityReply::from(verdict.decision())
            }
            Err(ProtocolError::Empty) => {
                warn!("empty badge request from {peer}; denying");
                AuthorityReply::Deny
            }
            Err(e) => return Err(e).context("unreadable badge request"),
        };

        let bytes = encode_reply(&reply);
        writer
            .lock()
            .await
            .write_all(&bytes)
            .await
            .context("write reply to reader failed")?;
    }

    Ok(())
}

/// One audit line per badge attempt, reason included on denials.
fn log_attempt(badge: &BadgeId, peer: SocketAddr, now: TimeOfDay, verdict: Verdict) {
    match verdict.deny_reason() {
        None => info!("badge {badge} from {peer} at {now}: ALLOW"),
        Some(reason) => info!("badge {badge} from {peer} at {now}: DENY ({reason})"),
    }
}

// ── Roster broadcast ──────────────────────────────────────────────────────────

/// Pushes the current roster to every connected reader.
///
/// Returns the number of readers that received the push.  A reader whose
/// socket rejects the write is dropped from the client set; its
/// connection task notices the dead socket on its next read and cleans
/// up the rest.
pub async fn broadcast_roster(state: &AuthorityState) -> usize {
    let roster = state.roster_snapshot().await;
    let payload = encode_reply(&AuthorityReply::UpdateList(roster));

    // Snapshot the client set; the guard is gone before any I/O below.
    let handles = state.client_handles().await;
    let total = handles.len();
    let mut delivered = 0;

    for (id, handle) in handles {
        let result = handle.writer.lock().await.write_all(&payload).await;
        match result {
            Ok(()) => {
                delivered += 1;
                debug!("roster push delivered to {}", handle.peer);
            }
            Err(e) => {
                warn!("roster push to {} failed: {e}; dropping reader", handle.peer);
                state.unregister_client(id).await;
            }
        }
    }

    info!("roster push: delivered to {delivered} of {total} reader(s)");
    delivered
}
