//! Core types for the cloud-vault client.
//!
//! Holds the data model (identity, session state, file records), the
//! error taxonomy shared by the auth and file-sync crates, and the
//! environment-driven configuration.

pub mod config;
pub mod error;
pub mod models;

pub use config::VaultConfig;
pub use error::{AuthError, VaultError};
pub use models::{BearerToken, FileKind, FileRecord, Identity, SessionState, UploadReceipt};
