//! Dashboard-side orchestration of listing and upload.
//!
//! [`SyncController`] holds the UI state the dashboard needs: the last
//! fetched listing, at most one staged upload, the in-flight flag, and a
//! success notice that expires on its own. Upload and the follow-up
//! listing refresh are strictly sequential; the refresh only starts once
//! the upload has fully resolved.

use std::io::Read;
use std::path::{Component, Path};

use tokio::time::{Duration, Instant};
use vault_core::{FileRecord, UploadReceipt, VaultError};

use crate::FileClient;

const SUCCESS_NOTICE: &str = "File uploaded successfully!";
const NOTICE_TTL: Duration = Duration::from_secs(3);

/// One file selected for upload; held transiently between selection and
/// submission, never persisted.
#[derive(Debug, Clone)]
pub struct StagedUpload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl StagedUpload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a local file into a staged upload.
    pub fn from_path(path: &Path) -> Result<Self, VaultError> {
        if path.components().any(|c| c == Component::ParentDir) {
            return Err(VaultError::Validation(format!(
                "invalid upload path: {}",
                path.display()
            )));
        }

        let mut file = std::fs::File::open(path)
            .map_err(|e| VaultError::Validation(format!("cannot open {}: {e}", path.display())))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| VaultError::Validation(format!("cannot read {}: {e}", path.display())))?;

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin")
            .to_string();

        Ok(Self { name, bytes })
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

/// Listing/upload state machine behind the dashboard.
pub struct SyncController {
    client: FileClient,
    files: Vec<FileRecord>,
    staged: Option<StagedUpload>,
    uploading: bool,
    notice: Option<(String, Instant)>,
}

impl SyncController {
    pub fn new(client: FileClient) -> Self {
        Self {
            client,
            files: Vec::new(),
            staged: None,
            uploading: false,
            notice: None,
        }
    }

    /// Last fetched listing.
    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    pub fn staged(&self) -> Option<&StagedUpload> {
        self.staged.as_ref()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    /// Upload affordance: one file staged and nothing in flight.
    pub fn can_submit(&self) -> bool {
        self.staged.is_some() && !self.uploading
    }

    /// Stage a file, replacing any previous selection.
    pub fn stage(&mut self, upload: StagedUpload) -> Result<(), VaultError> {
        if self.uploading {
            return Err(VaultError::Validation(
                "an upload is already in flight".into(),
            ));
        }
        self.staged = Some(upload);
        Ok(())
    }

    pub fn clear_staged(&mut self) {
        self.staged = None;
    }

    /// Re-fetch the listing. Backend failures were already degraded to
    /// the fallback listing by the client; only `NotAuthenticated`
    /// surfaces here.
    pub async fn refresh(&mut self) -> Result<&[FileRecord], VaultError> {
        let files = self.client.list_files().await?;
        self.files = files;
        Ok(&self.files)
    }

    /// Submit the staged file.
    ///
    /// On success: the staged selection is cleared, the listing is
    /// refreshed (sequentially, after the upload resolved), and a
    /// success notice is armed for three seconds. On failure the staged
    /// selection is retained so the user can retry.
    pub async fn submit(&mut self) -> Result<UploadReceipt, VaultError> {
        if self.uploading {
            return Err(VaultError::Validation(
                "an upload is already in flight".into(),
            ));
        }
        let Some(staged) = self.staged.as_ref() else {
            return Err(VaultError::Validation("no file staged for upload".into()));
        };

        self.uploading = true;
        let result = self
            .client
            .upload_file(&staged.name, staged.bytes.clone())
            .await;
        self.uploading = false;

        let receipt = result?;

        self.staged = None;
        self.refresh().await?;
        self.notice = Some((SUCCESS_NOTICE.to_string(), Instant::now() + NOTICE_TTL));

        Ok(receipt)
    }

    /// Current success notice, if it has not expired yet.
    pub fn notice(&mut self) -> Option<&str> {
        if let Some((_, deadline)) = &self.notice {
            if Instant::now() >= *deadline {
                self.notice = None;
            }
        }
        self.notice.as_ref().map(|(message, _)| message.as_str())
    }
}
