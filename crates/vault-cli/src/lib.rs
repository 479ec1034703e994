//! Shared helpers for the vault CLI binary.

use vault_core::FileKind;

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// Glyph shown next to a file in the listing. Display hint only; the
/// type tag comes straight from backend data and is never validated.
pub fn file_glyph(kind: FileKind) -> &'static str {
    match kind {
        FileKind::Pdf | FileKind::Document => "[doc]",
        FileKind::Image => "[img]",
        FileKind::Video => "[vid]",
        FileKind::Audio => "[aud]",
        FileKind::Archive => "[arc]",
        FileKind::Other => "[---]",
    }
}

/// Render a local file size the way the dashboard shows a selection,
/// e.g. `0.25 MB`.
pub fn format_size_mb(bytes: usize) -> String {
    format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
}
