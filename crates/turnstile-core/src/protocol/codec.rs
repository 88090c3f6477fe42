//! Plain-text codec for the reader wire protocol.
//!
//! # Wire format
//!
//! The protocol is deliberately tiny, because the deployed readers are
//! microcontrollers with a few kilobytes of RAM:
//!
//! - **Request** (reader → authority): the raw UTF-8 bytes of one badge
//!   ID.  No delimiter, no length prefix, nothing else.
//! - **Reply** (authority → reader), one of:
//!   - `ALLOW`
//!   - `DENY`
//!   - `UPDATE_LIST:` followed by a comma-separated badge roster
//!     (commas cannot appear inside an ID, so no escaping exists).
//!
//! # Framing
//!
//! There is no explicit framing.  Both sides assume that one logical
//! message arrives in a single `read` call, which holds in practice
//! because messages are far below one MTU, each side has at most one
//! message in flight per connection, and both peers write a whole
//! message with a single send.  Fielded readers depend on these exact
//! bytes, so this codec keeps the assumption rather than introducing a
//! delimiter the deployed firmware would choke on.  Buffer sizes on both
//! sides are [`MAX_MESSAGE_BYTES`].
//!
//! All decoding is strict and case-sensitive: anything that is not one
//! of the three reply shapes is a [`ProtocolError`], which the client
//! treats as loss of the connection.

use thiserror::Error;
use tracing::debug;

use crate::domain::badge::{BadgeId, BadgeIdError};
use crate::protocol::messages::AuthorityReply;

/// Read-buffer size used by both peers.
///
/// Large enough for a roster push of well over a hundred 8-character
/// badge IDs, which is beyond anything a single installation carries.
pub const MAX_MESSAGE_BYTES: usize = 1024;

/// Literal prefix of a roster push.
const UPDATE_LIST_PREFIX: &str = "UPDATE_LIST:";

/// Longest prefix of an unrecognised message echoed into errors and logs.
const PREVIEW_CHARS: usize = 48;

/// Errors that can occur while decoding wire messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The message was empty (or whitespace only).
    #[error("empty message")]
    Empty,

    /// The message was not valid UTF-8.
    #[error("message is not valid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// The message matched none of the reply shapes.
    #[error("unrecognised reply {0:?}")]
    UnknownReply(String),
}

// ── Requests ──────────────────────────────────────────────────────────────────

/// Encodes a badge request: the raw bytes of the ID, nothing more.
pub fn encode_request(badge: &BadgeId) -> Vec<u8> {
    badge.as_str().as_bytes().to_vec()
}

/// Decodes a badge request received by the authority.
///
/// Surrounding whitespace is tolerated (readers driven over a serial
/// console send CRLF line endings).
///
/// # Errors
///
/// [`ProtocolError::InvalidUtf8`] for non-UTF-8 input and
/// [`ProtocolError::Empty`] when nothing remains after trimming.
pub fn decode_request(bytes: &[u8]) -> Result<BadgeId, ProtocolError> {
    let text = std::str::from_utf8(bytes)?;
    BadgeId::new(text).map_err(|_| ProtocolError::Empty)
}

// ── Replies ───────────────────────────────────────────────────────────────────

/// Encodes an authority reply into its wire bytes.
pub fn encode_reply(reply: &AuthorityReply) -> Vec<u8> {
    match reply {
        AuthorityReply::Allow => b"ALLOW".to_vec(),
        AuthorityReply::Deny => b"DENY".to_vec(),
        AuthorityReply::UpdateList(ids) => {
            let payload_len: usize = ids.iter().map(|id| id.as_str().len() + 1).sum();
            let mut out = String::with_capacity(UPDATE_LIST_PREFIX.len() + payload_len);
            out.push_str(UPDATE_LIST_PREFIX);
            for (i, id) in ids.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(id.as_str());
            }
            out.into_bytes()
        }
    }
}

/// Decodes an authority reply received by a client.
///
/// Matching is exact and case-sensitive after trimming surrounding
/// whitespace.  Empty segments in a roster push (`UPDATE_LIST:A,,B`)
/// cannot be badge IDs and are skipped; `UPDATE_LIST:` with an empty
/// payload is a valid empty roster and clears the cache.
///
/// # Errors
///
/// [`ProtocolError::Empty`] for an empty message,
/// [`ProtocolError::InvalidUtf8`] for non-UTF-8 bytes, and
/// [`ProtocolError::UnknownReply`] for anything that is not one of the
/// three reply shapes.  Callers treat every one of these as loss of the
/// connection.
pub fn decode_reply(bytes: &[u8]) -> Result<AuthorityReply, ProtocolError> {
    let text = std::str::from_utf8(bytes)?.trim();
    if text.is_empty() {
        return Err(ProtocolError::Empty);
    }
    if text == "ALLOW" {
        return Ok(AuthorityReply::Allow);
    }
    if text == "DENY" {
        return Ok(AuthorityReply::Deny);
    }
    if let Some(payload) = text.strip_prefix(UPDATE_LIST_PREFIX) {
        return Ok(AuthorityReply::UpdateList(parse_roster(payload)));
    }
    Err(ProtocolError::UnknownReply(preview(text)))
}

/// Parses the comma-separated payload of a roster push.
fn parse_roster(payload: &str) -> Vec<BadgeId> {
    let mut ids = Vec::new();
    for segment in payload.split(',') {
        match BadgeId::new(segment) {
            Ok(id) => ids.push(id),
            // Only empty segments fail validation; `UPDATE_LIST:` with no
            // payload at all lands here too (split yields one "" segment).
            Err(BadgeIdError::Empty) => {
                if !payload.is_empty() {
                    debug!("skipping empty segment in roster push");
                }
            }
        }
    }
    ids
}

/// Truncates an unrecognised message for error text, keeping it printable.
fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        text.to_string()
    } else {
        let mut p: String = text.chars().take(PREVIEW_CHARS).collect();
        p.push_str("...");
        p
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
