//! Test support: a scripted identity provider.
//!
//! Used by the session tests here and by the file-sync crate's
//! integration tests. Results are scripted per call site and every
//! provider call is counted, so tests can assert both outcomes and
//! "no network call was made" properties.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};
use vault_core::{AuthError, BearerToken, Identity};

use crate::provider::{IdentityProvider, ProviderEvent};

pub fn test_identity() -> Identity {
    Identity {
        user_id: "user-1".into(),
        email: "user@example.com".into(),
        refresh_token: "refresh-1".into(),
    }
}

/// Scripted in-memory identity provider.
pub struct MockProvider {
    identity: Identity,
    sign_in_error: Mutex<Option<AuthError>>,
    sign_up_error: Mutex<Option<AuthError>>,
    sign_out_error: Mutex<Option<AuthError>>,
    issue_token_error: Mutex<Option<AuthError>>,
    restored: Mutex<Option<Identity>>,
    restore_gate: Mutex<Option<std::sync::Arc<Notify>>>,

    sign_in_calls: AtomicUsize,
    sign_up_calls: AtomicUsize,
    sign_out_calls: AtomicUsize,
    issue_token_calls: AtomicUsize,

    events_tx: mpsc::UnboundedSender<ProviderEvent>,
    events_rx: Mutex<Option<mpsc::UnboundedReceiver<ProviderEvent>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::with_identity(test_identity())
    }

    pub fn with_identity(identity: Identity) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            identity,
            sign_in_error: Mutex::new(None),
            sign_up_error: Mutex::new(None),
            sign_out_error: Mutex::new(None),
            issue_token_error: Mutex::new(None),
            restored: Mutex::new(None),
            restore_gate: Mutex::new(None),
            sign_in_calls: AtomicUsize::new(0),
            sign_up_calls: AtomicUsize::new(0),
            sign_out_calls: AtomicUsize::new(0),
            issue_token_calls: AtomicUsize::new(0),
            events_tx,
            events_rx: Mutex::new(Some(events_rx)),
        }
    }

    pub fn identity(&self) -> Identity {
        self.identity.clone()
    }

    pub fn fail_sign_in(&self, err: AuthError) {
        *self.sign_in_error.lock().expect("mock state poisoned") = Some(err);
    }

    pub fn fail_sign_up(&self, err: AuthError) {
        *self.sign_up_error.lock().expect("mock state poisoned") = Some(err);
    }

    pub fn fail_sign_out(&self, err: AuthError) {
        *self.sign_out_error.lock().expect("mock state poisoned") = Some(err);
    }

    pub fn fail_issue_token(&self, err: AuthError) {
        *self.issue_token_error.lock().expect("mock state poisoned") = Some(err);
    }

    /// Script the startup report to an existing session.
    pub fn set_restored(&self, identity: Identity) {
        *self.restored.lock().expect("mock state poisoned") = Some(identity);
    }

    /// Make `restore` block until [`release_restore`](Self::release_restore)
    /// is called, so tests can observe the pre-report `Unknown` state.
    pub fn hold_restore(&self) {
        *self.restore_gate.lock().expect("mock state poisoned") =
            Some(std::sync::Arc::new(Notify::new()));
    }

    pub fn release_restore(&self) {
        if let Some(gate) = self
            .restore_gate
            .lock()
            .expect("mock state poisoned")
            .as_ref()
        {
            gate.notify_one();
        }
    }

    /// Push a provider-initiated transition.
    pub fn emit(&self, event: ProviderEvent) {
        let _ = self.events_tx.send(event);
    }

    pub fn sign_in_calls(&self) -> usize {
        self.sign_in_calls.load(Ordering::SeqCst)
    }

    pub fn sign_up_calls(&self) -> usize {
        self.sign_up_calls.load(Ordering::SeqCst)
    }

    pub fn issue_token_calls(&self) -> usize {
        self.issue_token_calls.load(Ordering::SeqCst)
    }

    /// Total provider round-trips (everything except `restore`).
    pub fn network_calls(&self) -> usize {
        self.sign_in_calls.load(Ordering::SeqCst)
            + self.sign_up_calls.load(Ordering::SeqCst)
            + self.sign_out_calls.load(Ordering::SeqCst)
            + self.issue_token_calls.load(Ordering::SeqCst)
    }

    fn scripted_error(slot: &Mutex<Option<AuthError>>) -> Option<AuthError> {
        slot.lock().expect("mock state poisoned").clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for MockProvider {
    async fn restore(&self) -> Result<Option<Identity>, AuthError> {
        let gate = self
            .restore_gate
            .lock()
            .expect("mock state poisoned")
            .clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(self.restored.lock().expect("mock state poisoned").clone())
    }

    async fn sign_up(&self, _email: &str, _password: &str) -> Result<Identity, AuthError> {
        self.sign_up_calls.fetch_add(1, Ordering::SeqCst);
        match Self::scripted_error(&self.sign_up_error) {
            Some(err) => Err(err),
            None => Ok(self.identity.clone()),
        }
    }

    async fn sign_in(&self, email: &str, _password: &str) -> Result<Identity, AuthError> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        match Self::scripted_error(&self.sign_in_error) {
            Some(err) => Err(err),
            None => Ok(Identity {
                email: email.to_string(),
                ..self.identity.clone()
            }),
        }
    }

    async fn sign_out(&self, _identity: &Identity) -> Result<(), AuthError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        match Self::scripted_error(&self.sign_out_error) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn issue_token(&self, _identity: &Identity) -> Result<BearerToken, AuthError> {
        self.issue_token_calls.fetch_add(1, Ordering::SeqCst);
        match Self::scripted_error(&self.issue_token_error) {
            Some(err) => Err(err),
            None => {
                // A distinct token per issuance, mirroring a real refresh.
                let n = self.issue_token_calls.load(Ordering::SeqCst);
                Ok(BearerToken::new(format!("token-{n}")))
            }
        }
    }

    fn subscribe_events(&self) -> Option<mpsc::UnboundedReceiver<ProviderEvent>> {
        self.events_rx.lock().expect("mock state poisoned").take()
    }
}
