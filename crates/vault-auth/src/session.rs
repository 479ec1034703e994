//! The session manager: the single owner of the current identity.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use vault_core::{BearerToken, Identity, SessionState, VaultError};

use crate::provider::{IdentityProvider, ProviderEvent};

/// Owns the current-identity slot and mirrors provider-initiated
/// transitions. Cheap to clone; all clones share one slot.
///
/// State starts `Unknown` and settles once the provider's startup report
/// arrives. Only this type writes the slot: completed login/signup/logout
/// calls and provider events are the only transitions.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    provider: Arc<dyn IdentityProvider>,
    state: Arc<watch::Sender<SessionState>>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        // Release the provider listener with the last manager handle.
        if let Ok(mut pump) = self.pump.lock() {
            if let Some(handle) = pump.take() {
                handle.abort();
            }
        }
    }
}

impl SessionManager {
    /// Start listening to `provider`. Returns immediately in `Unknown`;
    /// the startup report and any subsequent provider events are applied
    /// by a background task that is released on [`shutdown`](Self::shutdown)
    /// or when the last handle is dropped.
    pub fn start(provider: Arc<dyn IdentityProvider>) -> Self {
        let (state, _) = watch::channel(SessionState::Unknown);
        let state = Arc::new(state);
        let manager = Self {
            inner: Arc::new(Inner {
                provider: provider.clone(),
                state: state.clone(),
                pump: Mutex::new(None),
            }),
        };

        let handle = tokio::spawn(async move {
            let initial = match provider.restore().await {
                Ok(Some(identity)) => SessionState::Authenticated(identity),
                Ok(None) => SessionState::Unauthenticated,
                Err(err) => {
                    warn!(error = %err, "session restore failed, treating as signed out");
                    SessionState::Unauthenticated
                }
            };
            apply(&state, initial);

            if let Some(mut events) = provider.subscribe_events() {
                while let Some(event) = events.recv().await {
                    let next = match event {
                        ProviderEvent::SignedIn(identity) => SessionState::Authenticated(identity),
                        ProviderEvent::SignedOut => SessionState::Unauthenticated,
                    };
                    apply(&state, next);
                }
            }
        });
        if let Ok(mut pump) = manager.inner.pump.lock() {
            *pump = Some(handle);
        }

        manager
    }

    /// Observe session-state transitions. Dropping the receiver releases
    /// the subscription.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Current state snapshot.
    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Wait until the provider has reported and the state is no longer
    /// `Unknown`. UIs must call this before any routing decision.
    pub async fn wait_settled(&self) -> SessionState {
        let mut rx = self.subscribe();
        let settled = match rx.wait_for(SessionState::is_settled).await {
            Ok(state) => state.clone(),
            // The sender lives in `inner`, so this is unreachable while
            // `self` exists; fall back to the snapshot regardless.
            Err(_) => self.state(),
        };
        settled
    }

    /// Sign in. On success the slot transitions to `Authenticated`; on
    /// failure the state is left untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, VaultError> {
        let identity = self.inner.provider.sign_in(email, password).await?;
        apply(
            &self.inner.state,
            SessionState::Authenticated(identity.clone()),
        );
        Ok(identity)
    }

    /// Create an account and sign it in. The confirmation check is local
    /// and fails before any provider call.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Identity, VaultError> {
        if password != confirm_password {
            return Err(VaultError::Validation("passwords do not match".into()));
        }
        let identity = self.inner.provider.sign_up(email, password).await?;
        apply(
            &self.inner.state,
            SessionState::Authenticated(identity.clone()),
        );
        Ok(identity)
    }

    /// Sign out. Best effort: the slot only transitions once the provider
    /// call succeeds, so callers must observe the transition rather than
    /// assume it.
    pub async fn logout(&self) -> Result<(), VaultError> {
        let Some(identity) = self.state().identity().cloned() else {
            return Ok(());
        };
        self.inner.provider.sign_out(&identity).await?;
        apply(&self.inner.state, SessionState::Unauthenticated);
        Ok(())
    }

    /// Mint a fresh bearer token for the current identity. Every call is
    /// a fresh issuance; callers must invoke this immediately before the
    /// request that needs it rather than caching the result.
    pub async fn current_token(&self) -> Result<BearerToken, VaultError> {
        let Some(identity) = self.state().identity().cloned() else {
            return Err(VaultError::NotAuthenticated);
        };
        let token = self.inner.provider.issue_token(&identity).await?;
        Ok(token)
    }

    /// Stop mirroring provider events. Idempotent.
    pub fn shutdown(&self) {
        if let Ok(mut pump) = self.inner.pump.lock() {
            if let Some(handle) = pump.take() {
                handle.abort();
            }
        }
    }
}

/// Apply a transition, suppressing redundant notifications when the
/// state is already the target (listeners see each state at most once
/// per change).
fn apply(state: &watch::Sender<SessionState>, next: SessionState) {
    state.send_if_modified(|current| {
        if *current == next {
            return false;
        }
        debug!(settled = next.is_settled(), authenticated = next.identity().is_some(),
            "session state transition");
        *current = next;
        true
    });
}
