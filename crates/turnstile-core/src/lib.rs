//! # turnstile-core
//!
//! Shared library for Turnstile containing the plain-text wire codec and
//! the access-decision domain types (badge identity, lock window, decision
//! vocabulary).
//!
//! This crate is used by both the authority and client applications.
//! It has zero dependencies on OS APIs, network sockets, or the async
//! runtime.
//!
//! # Architecture overview (for beginners)
//!
//! Turnstile is a badge access-control system: a door-side *client* reads
//! badge IDs from an RFID credential and decides whether to open the door.
//! While the networked *authority* is reachable, the client asks it for
//! every badge; when the network is down, the client falls back to a badge
//! list it cached locally the last time the authority pushed one.
//!
//! This crate (`turnstile-core`) is the shared foundation.  It defines:
//!
//! - **`protocol`** – How bytes travel over the network.  A request is the
//!   raw badge ID; a reply is one of the literal words `ALLOW` or `DENY`,
//!   or an `UPDATE_LIST:` push carrying a comma-separated badge roster.
//!
//! - **`domain`** – Pure business logic with no OS dependencies: the
//!   validated [`BadgeId`] type, the [`LockWindow`] time-of-day interval
//!   (which may wrap past midnight), and the [`Decision`]/[`Verdict`]
//!   vocabulary shared by both sides.

// Declare the two top-level modules.  Rust will look for each in a
// subdirectory with the same name (e.g., src/protocol/mod.rs).
pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `turnstile_core::BadgeId` instead of `turnstile_core::domain::badge::BadgeId`.
pub use domain::badge::{BadgeId, BadgeIdError};
pub use domain::decision::{Decision, DenyReason, Verdict};
pub use domain::lock_window::{ClockError, LockWindow, TimeOfDay};
pub use protocol::codec::{
    decode_reply, decode_request, encode_reply, encode_request, ProtocolError, MAX_MESSAGE_BYTES,
};
pub use protocol::messages::AuthorityReply;
