//! Authentication module for session credentials and the refresh flow.
//!
//! This module provides:
//! - `Session`: file-backed storage for the access/refresh token pair
//! - `CredentialStore`: secure OS-level password storage via keyring
//! - `RefreshGate`: single-flight coordination for token refresh
//! - `AuthState`: observable logged-in/logged-out state
//!
//! Access tokens are short-lived; expiry is discovered through 401 responses
//! and recovered by the coordinator in `crate::api::client`.

pub mod credentials;
pub mod refresh;
pub mod session;

pub use credentials::CredentialStore;
pub use refresh::{RefreshError, RefreshGate, RefreshOutcome, Ticket};
pub use session::{Session, SessionData, TokenPair};

/// Client-visible authentication state, published on a watch channel by
/// `ApiClient`. A transition to `LoggedOut` is the host application's cue
/// to return to its login screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    LoggedOut,
    Authenticated,
}
