//! Application layer use cases for the door reader client.
//!
//! # What use cases does the client have?
//!
//! - **`authorize`** – Decides one scanned badge.  Asks the authority
//!   when the connection is up, falls back to the cached local list the
//!   moment it is not, and applies roster pushes that arrive in between.
//!   This is the whole reason the reader exists; everything else in the
//!   crate feeds it.

pub mod authorize;

pub use authorize::Authorizer;
