//! REST API client module for the account service.
//!
//! The service exposes four endpoints: signup, login, profile fetch, and
//! profile edit. Authentication is a JWT bearer token delivered (and
//! occasionally rotated) through the `x-jwt` response header.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
