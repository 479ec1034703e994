//! Identity provider seam.
//!
//! The real provider lives in [`crate::rest`]; tests drive the session
//! manager through [`crate::testing::MockProvider`].

use async_trait::async_trait;
use tokio::sync::mpsc;
use vault_core::{AuthError, BearerToken, Identity};

/// Provider-initiated session transition, e.g. an external sign-out or
/// token revocation observed by the provider.
#[derive(Debug, Clone)]
pub enum ProviderEvent {
    SignedIn(Identity),
    SignedOut,
}

/// External identity provider surface consumed by the session manager.
///
/// Credential storage, token signing, and verification all live on the
/// provider side; this trait only covers the calls the client makes.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The provider's startup report: a previously persisted session, or
    /// `None`. The session manager turns this into the single initial
    /// `Unknown -> settled` transition.
    async fn restore(&self) -> Result<Option<Identity>, AuthError>;

    /// Create an account and sign it in.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn sign_out(&self, identity: &Identity) -> Result<(), AuthError>;

    /// Mint a fresh bearer token for `identity`. Implementations must
    /// not serve a cached token; every call is a fresh issuance.
    async fn issue_token(&self, identity: &Identity) -> Result<BearerToken, AuthError>;

    /// Push channel for provider-initiated transitions. `None` when the
    /// provider has no such channel (the REST provider does not).
    fn subscribe_events(&self) -> Option<mpsc::UnboundedReceiver<ProviderEvent>> {
        None
    }
}
