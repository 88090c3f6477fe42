//! Infrastructure layer: TCP listener, operator console, configuration.

pub mod config;
pub mod console;
pub mod network;
