//! turnstile-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does turnstile-client do? (for beginners)
//!
//! The *client* runs on the door reader itself.  When someone scans a
//! badge, the reader must answer one question: open the door or not.
//! It prefers to ask the authority server, which holds the live roster
//! and the lock window, but a door cannot stop working because the
//! network did.
//!
//! The client application:
//!
//! 1. Tries to reach the authority at startup (a few bounded attempts),
//!    then settles into ONLINE or OFFLINE mode.
//! 2. ONLINE: sends each scanned badge to the authority and enforces the
//!    `ALLOW`/`DENY` it gets back.  Roster pushes (`UPDATE_LIST:…`) from
//!    the authority replace the cached local list on disk.
//! 3. OFFLINE: answers from the cached list alone.  A badge on the list
//!    is allowed, anything else (including an empty or missing cache) is
//!    denied.  Lock windows are not evaluated locally; only the
//!    authority knows them.
//! 4. Keeps trying to get back ONLINE in the background, at most one
//!    attempt per reconnect interval.
//!
//! The physical badge scanner and status display are behind small traits
//! in the infrastructure layer, so the same decision logic runs against
//! real hardware, stdin, or scripted test doubles.

/// Application layer: the badge authorization use case.
pub mod application;

/// Infrastructure layer: network, cache file, and hardware adapters.
pub mod infrastructure;
