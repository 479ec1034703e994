//! HTTP client for the vault file backend.
//!
//! [`FileClient`] mints a fresh bearer token through the session manager
//! before every request. Listing failures degrade to a fixed fallback
//! dataset (logged, never surfaced); upload failures always surface,
//! since fabricating a successful upload would be unsafe. The asymmetry
//! is intentional.

pub mod fallback;
pub mod sync;

use std::time::Duration;

use tracing::warn;
use vault_auth::SessionManager;
use vault_core::{BearerToken, FileRecord, UploadReceipt, VaultConfig, VaultError};

pub use sync::{StagedUpload, SyncController};

/// Client for the file-storage backend.
#[derive(Clone)]
pub struct FileClient {
    session: SessionManager,
    client: reqwest::Client,
    base_url: String,
    list_timeout: Duration,
    upload_timeout: Duration,
}

impl FileClient {
    pub fn new(session: SessionManager, config: &VaultConfig) -> Result<Self, VaultError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| VaultError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            session,
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            list_timeout: Duration::from_secs(config.list_timeout_secs),
            upload_timeout: Duration::from_secs(config.upload_timeout_secs),
        })
    }

    /// Fetch the file listing.
    ///
    /// `NotAuthenticated` propagates so the UI can route to login. Any
    /// backend-communication failure after that point is swallowed in
    /// favor of the fixed fallback listing; the failure is only logged.
    pub async fn list_files(&self) -> Result<Vec<FileRecord>, VaultError> {
        let token = self.session.current_token().await?;
        match self.fetch_listing(&token).await {
            Ok(files) => Ok(files),
            Err(err) if err.is_transport() => {
                warn!(error = %err, "file listing failed, serving fallback listing");
                Ok(fallback::fallback_listing())
            }
            Err(err) => Err(err),
        }
    }

    async fn fetch_listing(&self, token: &BearerToken) -> Result<Vec<FileRecord>, VaultError> {
        let url = format!("{}/api/files", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", token.as_str()))
            .timeout(self.list_timeout)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(VaultError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| VaultError::Network(format!("malformed listing response: {e}")))
    }

    /// Upload one file as a multipart body. Failures propagate; there is
    /// no fallback on the write path.
    pub async fn upload_file(&self, name: &str, bytes: Vec<u8>) -> Result<UploadReceipt, VaultError> {
        let token = self.session.current_token().await?;
        let url = format!("{}/api/upload", self.base_url);

        let form = reqwest::multipart::Form::new().part(
            "file",
            reqwest::multipart::Part::bytes(bytes).file_name(name.to_string()),
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token.as_str()))
            .multipart(form)
            .timeout(self.upload_timeout)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(VaultError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| VaultError::Network(format!("malformed upload response: {e}")))
    }
}

fn transport_error(err: reqwest::Error) -> VaultError {
    if err.is_timeout() {
        VaultError::Network(format!("request timed out: {err}"))
    } else {
        VaultError::Network(err.to_string())
    }
}
