//! accterm - a keyboard-driven terminal client for the account service.
//!
//! The library half of the crate: the API client, the session manager, the
//! app state machine, and the TUI. The binary in `main.rs` wires these to a
//! terminal.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod models;
pub mod ui;
pub mod utils;
