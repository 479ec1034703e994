//! Error taxonomy for the vault client.
//!
//! `AuthError` covers identity-provider failures; `VaultError` is the
//! umbrella the rest of the client speaks. No variant is fatal: every
//! error is recoverable at the interaction level (retry, re-login, or
//! fall back).

/// Failure reported by the identity provider.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("identity provider unreachable: {0}")]
    NetworkUnavailable(String),

    #[error("identity provider error: {0}")]
    Unknown(String),
}

/// Client-wide error type.
#[derive(Debug, Clone, thiserror::Error)]
pub enum VaultError {
    /// Local validation failure; never reaches the network.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// An operation requiring a token was attempted with no identity.
    /// UIs should route to login rather than display this raw.
    #[error("not authenticated")]
    NotAuthenticated,

    /// Timeout or transport failure on a backend call.
    #[error("network error: {0}")]
    Network(String),

    /// Backend reachable but responded with a failure status.
    #[error("backend responded with status {status}: {message}")]
    Backend { status: u16, message: String },
}

impl VaultError {
    /// Backend-communication failures. These are the only errors the
    /// listing path is allowed to swallow in favor of fallback data;
    /// everything else must surface.
    pub fn is_transport(&self) -> bool {
        matches!(self, VaultError::Network(_) | VaultError::Backend { .. })
    }

    /// Errors that should send the user back to the login screen.
    pub fn requires_login(&self) -> bool {
        matches!(self, VaultError::NotAuthenticated)
    }
}
