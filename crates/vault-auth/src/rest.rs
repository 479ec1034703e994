//! REST identity provider (Identity Toolkit surface).
//!
//! Accounts are created and signed in against the `accounts:signUp` /
//! `accounts:signInWithPassword` endpoints; bearer tokens are minted via
//! the refresh-token grant on the secure-token endpoint. Base URLs are
//! injected so tests can point the provider at a mock server.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use vault_core::{AuthError, BearerToken, Identity, VaultConfig};

use crate::provider::IdentityProvider;

const HTTP_TIMEOUT_SECS: u64 = 10;

/// Provider error codes that mean the credentials themselves were
/// rejected. Everything else from the provider is reported as-is.
const CREDENTIAL_ERRORS: &[&str] = &[
    "EMAIL_NOT_FOUND",
    "INVALID_PASSWORD",
    "INVALID_LOGIN_CREDENTIALS",
    "INVALID_EMAIL",
    "USER_DISABLED",
    "EMAIL_EXISTS",
    "WEAK_PASSWORD",
    "MISSING_PASSWORD",
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    id_token: String,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: ProviderErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    message: String,
}

/// Identity provider client over the REST surface.
#[derive(Clone, Debug)]
pub struct RestIdentityProvider {
    client: reqwest::Client,
    auth_base_url: String,
    token_base_url: String,
    api_key: String,
}

impl RestIdentityProvider {
    pub fn new(
        auth_base_url: impl Into<String>,
        token_base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| AuthError::Unknown(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            auth_base_url: trim_base(auth_base_url.into()),
            token_base_url: trim_base(token_base_url.into()),
            api_key: api_key.into(),
        })
    }

    /// Build from [`VaultConfig`]; the provider API key is required.
    pub fn from_config(config: &VaultConfig) -> Result<Self, AuthError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| AuthError::Unknown("missing provider API key (VAULT_API_KEY)".into()))?;
        Self::new(
            config.auth_base_url.clone(),
            config.token_base_url.clone(),
            api_key,
        )
    }

    async fn account_call(&self, endpoint: &str, email: &str, password: &str) -> Result<Identity, AuthError> {
        let url = format!(
            "{}/v1/accounts:{}?key={}",
            self.auth_base_url, endpoint, self.api_key
        );
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_provider_error(status.as_u16(), &text));
        }

        let account: AccountResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Unknown(format!("malformed provider response: {e}")))?;

        Ok(Identity {
            user_id: account.local_id,
            email: account.email,
            refresh_token: account.refresh_token,
        })
    }
}

#[async_trait]
impl IdentityProvider for RestIdentityProvider {
    async fn restore(&self) -> Result<Option<Identity>, AuthError> {
        // No persisted local session; every process starts signed out.
        Ok(None)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.account_call("signUp", email, password).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.account_call("signInWithPassword", email, password).await
    }

    async fn sign_out(&self, _identity: &Identity) -> Result<(), AuthError> {
        // Sign-out is client-side on this surface: dropping the refresh
        // token ends the session. Nothing to revoke remotely.
        Ok(())
    }

    async fn issue_token(&self, identity: &Identity) -> Result<BearerToken, AuthError> {
        let url = format!("{}/v1/token?key={}", self.token_base_url, self.api_key);
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", identity.refresh_token.as_str()),
        ];

        let response = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_provider_error(status.as_u16(), &text));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Unknown(format!("malformed token response: {e}")))?;

        Ok(BearerToken::new(token.id_token))
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

fn transport_error(err: reqwest::Error) -> AuthError {
    AuthError::NetworkUnavailable(err.to_string())
}

/// Map a provider error body to the taxonomy. Provider messages may
/// carry a suffix (e.g. "WEAK_PASSWORD : Password should be ..."), so
/// only the leading code is matched.
fn classify_provider_error(status: u16, body: &str) -> AuthError {
    let message = serde_json::from_str::<ProviderErrorBody>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| format!("status {status}"));

    let code = message
        .split(|c: char| c == ':' || c.is_whitespace())
        .next()
        .unwrap_or("");

    if CREDENTIAL_ERRORS.contains(&code) {
        AuthError::InvalidCredentials
    } else {
        AuthError::Unknown(message)
    }
}
