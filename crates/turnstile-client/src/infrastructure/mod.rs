//! Infrastructure layer for the door reader client.
//!
//! Contains the outward-facing adapters: the TCP link to the authority,
//! the on-disk badge cache, the scanner and display hardware traits, and
//! the TOML config loader.
//!
//! **Dependency rule**: this layer may depend on `turnstile_core`, but
//! MUST NOT reach back into `application`.
//!
//! # Sub-modules
//!
//! - **`network`** – Connects to the authority, runs one request/reply
//!   exchange per badge, and owns the ONLINE/OFFLINE mode with its
//!   bounded retry and reconnect timers.
//!
//! - **`store`** – The cached badge list at `local_badges.json`.  Reads
//!   never fail the caller; a missing or corrupt file is an empty
//!   (deny-all) list.
//!
//! - **`badge_reader`** – The scanner as a trait.  Ships a stdin-backed
//!   implementation for bench testing and a scripted one for tests;
//!   real RFID hardware plugs in behind the same trait.
//!
//! - **`status_panel`** – The reader's display surface as a trait, fed
//!   with coarse events (`AccessGranted`, `OfflineMode`, …).  Ships a
//!   log-backed implementation and a recording test double.
//!
//! - **`config`** – `client.toml` loading with built-in defaults.

pub mod badge_reader;
pub mod config;
pub mod network;
pub mod status_panel;
pub mod store;
