//! Authentication module for session and credential management.
//!
//! - `SessionStore`: single owner of the bearer token - acquisition,
//!   persistence, request attachment, rotation, and invalidation
//! - `CredentialStore`: OS-level password storage via keyring
//!
//! The session survives restarts through a JSON file in the state directory
//! and is dropped when the server confirms the token is no longer valid.

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::{SessionEvent, SessionStore, REFRESH_HEADER};
