//! Configuration for the vault client.
//!
//! Everything is environment-driven with working defaults so the CLI
//! runs against a local backend out of the box. The binary is expected
//! to load `.env` (dotenvy) before calling `from_env`.

use std::env;

const DEFAULT_API_URL: &str = "http://localhost:5000";
const DEFAULT_AUTH_URL: &str = "https://identitytoolkit.googleapis.com";
const DEFAULT_TOKEN_URL: &str = "https://securetoken.googleapis.com";
const DEFAULT_LIST_TIMEOUT_SECS: u64 = 5;
const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 10;

/// Client configuration.
#[derive(Clone, Debug)]
pub struct VaultConfig {
    /// File-storage backend base URL (no trailing slash).
    pub api_base_url: String,
    /// Identity provider account endpoint base.
    pub auth_base_url: String,
    /// Identity provider token-exchange endpoint base.
    pub token_base_url: String,
    /// Identity provider web API key. Required by the REST provider;
    /// optional here so offline commands still construct a config.
    pub api_key: Option<String>,
    /// Read timeout for the file listing, in seconds.
    pub list_timeout_secs: u64,
    /// Write timeout for uploads, in seconds.
    pub upload_timeout_secs: u64,
}

impl VaultConfig {
    pub fn from_env() -> Self {
        Self {
            api_base_url: env::var("VAULT_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            auth_base_url: env::var("VAULT_AUTH_URL")
                .unwrap_or_else(|_| DEFAULT_AUTH_URL.to_string()),
            token_base_url: env::var("VAULT_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_string()),
            api_key: env::var("VAULT_API_KEY").ok(),
            list_timeout_secs: parse_env_u64("VAULT_LIST_TIMEOUT_SECS", DEFAULT_LIST_TIMEOUT_SECS),
            upload_timeout_secs: parse_env_u64(
                "VAULT_UPLOAD_TIMEOUT_SECS",
                DEFAULT_UPLOAD_TIMEOUT_SECS,
            ),
        }
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            auth_base_url: DEFAULT_AUTH_URL.to_string(),
            token_base_url: DEFAULT_TOKEN_URL.to_string(),
            api_key: None,
            list_timeout_secs: DEFAULT_LIST_TIMEOUT_SECS,
            upload_timeout_secs: DEFAULT_UPLOAD_TIMEOUT_SECS,
        }
    }
}

fn parse_env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}
