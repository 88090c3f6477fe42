//! Network infrastructure for the door reader client.
//!
//! Owns the TCP link to the authority and the reader's ONLINE/OFFLINE
//! mode, including every timer that governs how eagerly the reader goes
//! back to the network.
//!
//! Architecture:
//! - [`AuthorityLink`] wraps one connected stream: send a badge, read a
//!   reply, or poll briefly for an unsolicited roster push.
//! - [`ConnectivityManager`] owns the link (or the lack of one), the
//!   startup attempt sequence, and the background reconnect gate.
//! - Decision logic never touches sockets directly; it borrows the link
//!   through the manager and reports failures back via
//!   [`ConnectivityManager::mark_offline`].
//!
//! Failures at this layer are uniform by design: refused, timed out,
//! reset, closed, and unintelligible all just mean "the authority cannot
//! answer right now", and the caller's response is always the same
//! (fall back to the cached list).  [`ClientNetworkError`] keeps the
//! variants distinct for the log line, nothing more.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

use turnstile_core::{
    decode_reply, encode_request, AuthorityReply, BadgeId, ProtocolError, MAX_MESSAGE_BYTES,
};

use crate::infrastructure::config::{AuthorityAddr, ConnectionConfig};
use crate::infrastructure::status_panel::{PanelEvent, StatusPanel};

/// Errors that can occur in the client network layer.
#[derive(Debug, Error)]
pub enum ClientNetworkError {
    /// TCP connection to the authority failed outright.
    #[error("failed to connect to authority at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    /// TCP connection attempt exceeded its time budget.
    #[error("connect to authority at {addr} timed out")]
    ConnectTimeout { addr: String },
    /// An I/O error occurred on the established connection.
    #[error("connection I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The authority accepted the badge but never answered.
    #[error("authority did not reply within {0:?}")]
    ResponseTimeout(Duration),
    /// The connection was closed by the authority.
    #[error("connection closed by authority")]
    Closed,
    /// The authority sent something the protocol does not define.
    #[error("unintelligible authority message: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Whether badge decisions come from the authority or the local cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Connected; the authority decides.
    Online,
    /// Not connected; the cached list decides.
    Offline,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Online => write!(f, "ONLINE"),
            Mode::Offline => write!(f, "OFFLINE"),
        }
    }
}

// ── The link ──────────────────────────────────────────────────────────────────

/// One connected exchange channel to the authority.
///
/// The stream is owned exclusively; the reader client is single-flow, so
/// there is never a second task wanting the socket.
pub struct AuthorityLink {
    stream: TcpStream,
    response_timeout: Duration,
    buf: Vec<u8>,
}

impl AuthorityLink {
    /// Opens a connection, bounded by `connect_timeout`.
    ///
    /// Host names in `endpoint` resolve through the system resolver as
    /// part of the connect.
    ///
    /// # Errors
    ///
    /// [`ClientNetworkError::ConnectTimeout`] when the budget elapses,
    /// [`ClientNetworkError::Connect`] for refusal and resolver errors.
    pub async fn connect(
        endpoint: (String, u16),
        connect_timeout: Duration,
        response_timeout: Duration,
    ) -> Result<Self, ClientNetworkError> {
        let addr = format!("{}:{}", endpoint.0, endpoint.1);
        let stream = match timeout(connect_timeout, TcpStream::connect(endpoint)).await {
            Err(_) => return Err(ClientNetworkError::ConnectTimeout { addr }),
            Ok(Err(e)) => return Err(ClientNetworkError::Connect { addr, source: e }),
            Ok(Ok(stream)) => stream,
        };
        debug!("authority link established to {addr}");
        Ok(Self {
            stream,
            response_timeout,
            buf: vec![0u8; MAX_MESSAGE_BYTES],
        })
    }

    /// Sends one badge check request.
    pub async fn send_badge(&mut self, badge: &BadgeId) -> Result<(), ClientNetworkError> {
        self.stream.write_all(&encode_request(badge)).await?;
        Ok(())
    }

    /// Reads the next authority message, waiting up to the response
    /// timeout.
    ///
    /// # Errors
    ///
    /// [`ClientNetworkError::ResponseTimeout`] if nothing arrives in
    /// time and [`ClientNetworkError::Closed`] on a zero-length read.
    pub async fn read_reply(&mut self) -> Result<AuthorityReply, ClientNetworkError> {
        match timeout(self.response_timeout, self.stream.read(&mut self.buf)).await {
            Err(_) => Err(ClientNetworkError::ResponseTimeout(self.response_timeout)),
            Ok(Ok(0)) => Err(ClientNetworkError::Closed),
            Ok(Ok(n)) => Ok(decode_reply(&self.buf[..n])?),
            Ok(Err(e)) => Err(e.into()),
        }
    }

    /// Polls briefly for an unsolicited message between badge checks.
    ///
    /// `Ok(None)` when the window passes quietly, which is the common
    /// case.  A closed or broken connection surfaces as an error so the
    /// caller can drop the link.
    pub async fn try_read_push(
        &mut self,
        window: Duration,
    ) -> Result<Option<AuthorityReply>, ClientNetworkError> {
        match timeout(window, self.stream.read(&mut self.buf)).await {
            Err(_) => Ok(None),
            Ok(Ok(0)) => Err(ClientNetworkError::Closed),
            Ok(Ok(n)) => Ok(Some(decode_reply(&self.buf[..n])?)),
            Ok(Err(e)) => Err(e.into()),
        }
    }
}

// ── Mode management ───────────────────────────────────────────────────────────

/// Owns the authority link and the ONLINE/OFFLINE state around it.
///
/// Mode transitions all happen here, and each one is rendered on the
/// panel exactly once:
///
/// ```text
///            connect_initial: attempt 1..=N, retry_delay apart
///   start ──────────────────────────────▶ ONLINE
///     │                                     │
///     │ all attempts fail                   │ any exchange failure
///     ▼                                     ▼ (mark_offline)
///   OFFLINE ◀───────────────────────────────┘
///     │
///     │ maintain: one attempt per reconnect_interval
///     └────────────────────────────────▶ ONLINE again
/// ```
pub struct ConnectivityManager {
    authority: AuthorityAddr,
    timings: ConnectionConfig,
    panel: Arc<dyn StatusPanel>,
    mode: Mode,
    link: Option<AuthorityLink>,
    /// Earliest moment `maintain` may try again; `None` means no gate.
    next_reconnect: Option<Instant>,
}

impl ConnectivityManager {
    /// Creates a manager that is OFFLINE with no link.  Call
    /// [`ConnectivityManager::connect_initial`] to go online.
    pub fn new(
        authority: AuthorityAddr,
        timings: ConnectionConfig,
        panel: Arc<dyn StatusPanel>,
    ) -> Self {
        Self {
            authority,
            timings,
            panel,
            mode: Mode::Offline,
            link: None,
            next_reconnect: None,
        }
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether a live link exists.
    pub fn is_online(&self) -> bool {
        self.mode == Mode::Online
    }

    /// Borrows the link for one exchange.  `None` while OFFLINE.
    pub fn link_mut(&mut self) -> Option<&mut AuthorityLink> {
        self.link.as_mut()
    }

    async fn attempt(&self) -> Result<AuthorityLink, ClientNetworkError> {
        AuthorityLink::connect(
            self.authority.endpoint(),
            self.timings.connect_timeout(),
            self.timings.response_timeout(),
        )
        .await
    }

    /// Runs the startup connection sequence.
    ///
    /// Up to `initial_attempts` tries, `retry_delay` apart, each bounded
    /// by the connect timeout.  First success goes ONLINE; exhaustion
    /// settles OFFLINE and starts the reconnect clock.  Either way the
    /// reader comes up able to decide badges.
    pub async fn connect_initial(&mut self) {
        self.panel.render(PanelEvent::Connecting);
        let max_attempts = self.timings.initial_attempts;

        for attempt in 1..=max_attempts {
            self.panel.render(PanelEvent::ConnectAttempt {
                attempt,
                max_attempts,
            });
            match self.attempt().await {
                Ok(link) => {
                    info!("connected to authority at {}", self.authority.display());
                    self.link = Some(link);
                    self.mode = Mode::Online;
                    self.next_reconnect = None;
                    return;
                }
                Err(e) => {
                    warn!("connection attempt {attempt} of {max_attempts} failed: {e}");
                    if attempt < max_attempts {
                        sleep(self.timings.retry_delay()).await;
                    }
                }
            }
        }

        warn!(
            "authority at {} unreachable after {max_attempts} attempt(s); starting OFFLINE",
            self.authority.display()
        );
        self.mark_offline();
    }

    /// One turn of background connection upkeep.
    ///
    /// While OFFLINE, makes at most one reconnect attempt per
    /// `reconnect_interval`; a failed attempt resets the clock.  ONLINE
    /// or inside the gate, this returns immediately.
    pub async fn maintain(&mut self) {
        if self.mode == Mode::Online {
            return;
        }
        if let Some(at) = self.next_reconnect {
            if Instant::now() < at {
                return;
            }
        }

        debug!("attempting authority reconnect");
        match self.attempt().await {
            Ok(link) => {
                info!("reconnected to authority at {}", self.authority.display());
                self.link = Some(link);
                self.mode = Mode::Online;
                self.next_reconnect = None;
                self.panel.render(PanelEvent::Reconnected);
            }
            Err(e) => {
                debug!("reconnect attempt failed: {e}");
                self.next_reconnect = Some(Instant::now() + self.timings.reconnect_interval());
            }
        }
    }

    /// Drops the link and goes OFFLINE, starting the reconnect clock.
    ///
    /// The decision path calls this the moment any exchange fails (the
    /// half-dead socket is discarded rather than probed); the startup
    /// sequence calls it when every attempt is exhausted.
    pub fn mark_offline(&mut self) {
        self.link = None;
        self.mode = Mode::Offline;
        self.next_reconnect = Some(Instant::now() + self.timings.reconnect_interval());
        self.panel.render(PanelEvent::OfflineMode);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
