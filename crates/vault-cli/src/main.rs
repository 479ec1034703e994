//! Secure cloud-vault CLI.
//!
//! Set VAULT_EMAIL and VAULT_PASSWORD (or pass --email/--password) plus
//! VAULT_API_KEY for the identity provider; VAULT_API_URL points at the
//! file backend.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::warn;
use vault_api_client::{FileClient, StagedUpload, SyncController};
use vault_auth::{RestIdentityProvider, SessionManager};
use vault_cli::{file_glyph, format_size_mb, init_tracing};
use vault_core::{FileRecord, VaultConfig, VaultError};

#[derive(Parser)]
#[command(name = "vault", about = "Secure cloud-vault CLI")]
struct Cli {
    /// Account email (or VAULT_EMAIL)
    #[arg(long)]
    email: Option<String>,

    /// Account password (or VAULT_PASSWORD)
    #[arg(long)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and sign it in
    Signup {
        /// Confirmation password (or VAULT_CONFIRM_PASSWORD)
        #[arg(long)]
        confirm_password: Option<String>,
    },
    /// Sign in and print a freshly issued bearer token
    Login,
    /// List files in the vault
    List,
    /// Upload a file to the vault
    Upload {
        /// Path to the file to upload
        file: PathBuf,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn print_listing(files: &[FileRecord]) {
    if files.is_empty() {
        println!("No files uploaded yet");
        return;
    }
    for file in files {
        println!(
            "{} {:<40} {:>10}  {}",
            file_glyph(file.kind),
            file.name,
            file.size,
            file.upload_date
        );
    }
}

fn credential(flag: Option<String>, env_key: &str, what: &str) -> anyhow::Result<String> {
    flag.or_else(|| std::env::var(env_key).ok())
        .with_context(|| format!("Missing {what}. Pass the flag or set {env_key}"))
}

/// Start the session manager, wait for the state to settle, and sign in.
/// Routing never happens while the session is still unknown.
async fn signed_in(
    config: &VaultConfig,
    email: &str,
    password: &str,
) -> anyhow::Result<SessionManager> {
    let provider = Arc::new(RestIdentityProvider::from_config(config)?);
    let manager = SessionManager::start(provider);
    manager.wait_settled().await;
    manager
        .login(email, password)
        .await
        .context("Failed to sign in")?;
    Ok(manager)
}

/// Best-effort sign-out; the session slot only transitions if the
/// provider call succeeds, so a failure is just logged.
async fn sign_out(manager: &SessionManager) {
    if let Err(err) = manager.logout().await {
        warn!(error = %err, "logout failed");
    }
    manager.shutdown();
}

fn route_file_error(err: VaultError) -> anyhow::Error {
    if err.requires_login() {
        anyhow::anyhow!("Session expired. Please sign in again")
    } else {
        err.into()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = VaultConfig::from_env();

    let email = credential(cli.email, "VAULT_EMAIL", "account email")?;
    let password = credential(cli.password, "VAULT_PASSWORD", "account password")?;

    match cli.command {
        Commands::Signup { confirm_password } => {
            let confirm = credential(
                confirm_password,
                "VAULT_CONFIRM_PASSWORD",
                "confirmation password",
            )?;
            let provider = Arc::new(RestIdentityProvider::from_config(&config)?);
            let manager = SessionManager::start(provider);
            manager.wait_settled().await;
            let identity = manager
                .signup(&email, &password, &confirm)
                .await
                .context("Failed to create account")?;
            println!("Account created for {}", identity.email);
            sign_out(&manager).await;
        }
        Commands::Login => {
            let manager = signed_in(&config, &email, &password).await?;
            let token = manager.current_token().await?;
            println!("Signed in as {}", email);
            println!("Bearer token: {}", token.as_str());
            sign_out(&manager).await;
        }
        Commands::List => {
            let manager = signed_in(&config, &email, &password).await?;
            let client = FileClient::new(manager.clone(), &config)?;
            let mut controller = SyncController::new(client);
            let result = controller.refresh().await.map(<[FileRecord]>::to_vec);
            sign_out(&manager).await;
            print_listing(&result.map_err(route_file_error)?);
        }
        Commands::Upload { file } => {
            let manager = signed_in(&config, &email, &password).await?;
            let client = FileClient::new(manager.clone(), &config)?;
            let mut controller = SyncController::new(client);

            let staged = StagedUpload::from_path(&file)?;
            println!(
                "Selected: {} ({})",
                staged.name,
                format_size_mb(staged.size_bytes())
            );
            controller.stage(staged)?;

            let result = controller.submit().await;
            match result {
                Ok(receipt) => {
                    print_json(&receipt)?;
                    if let Some(notice) = controller.notice() {
                        println!("{}", notice);
                    }
                    print_listing(controller.files());
                    sign_out(&manager).await;
                }
                Err(err) => {
                    // The staged selection survives an upload failure,
                    // but a one-shot process has nothing to retry into.
                    sign_out(&manager).await;
                    return Err(route_file_error(err)).context("Upload failed");
                }
            }
        }
    }

    Ok(())
}
