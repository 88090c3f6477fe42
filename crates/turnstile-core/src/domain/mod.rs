//! Domain module containing pure access-control logic.
//!
//! Everything in here is free of I/O: badge identity, the lock-window
//! clock math, and the decision vocabulary.  Both the authority and the
//! client build on these types.

pub mod badge;
pub mod decision;
pub mod lock_window;

pub use badge::{BadgeId, BadgeIdError};
pub use decision::{Decision, DenyReason, Verdict};
pub use lock_window::{ClockError, LockWindow, TimeOfDay};
