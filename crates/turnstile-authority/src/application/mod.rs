//! Application layer: shared authority state and operator commands.
//!
//! Nothing in here opens a socket.  The network and console layers in
//! `infrastructure` call into these modules.

pub mod admin;
pub mod state;

pub use admin::{parse_command, AdminCommand, AdminParseError};
pub use state::{AuthorityState, LockBounds};
