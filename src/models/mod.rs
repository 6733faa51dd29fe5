//! Data models for the account service.
//!
//! - `Account`: the profile record as returned by the server (display-only)
//! - `ProfileUpdate`: the editable subset sent to the edit endpoint
//! - `LoginRequest` / `SignupRequest`: credential-carrying request bodies

pub mod account;

pub use account::{Account, LoginRequest, ProfileUpdate, SignupRequest};
