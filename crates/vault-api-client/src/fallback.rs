//! Fixed fallback listing served when the backend is unreachable.
//!
//! Deliberate demo-resilience behavior: a listing failure degrades to
//! this deterministic dataset instead of an error screen. Uploads never
//! fall back.

use vault_core::{FileKind, FileRecord};

/// The two fixed records returned on any listing failure.
pub fn fallback_listing() -> Vec<FileRecord> {
    vec![
        FileRecord {
            id: "1".into(),
            name: "sample-document.pdf".into(),
            size: "2.1 MB".into(),
            kind: FileKind::Pdf,
            upload_date: "2024-09-28".into(),
        },
        FileRecord {
            id: "2".into(),
            name: "example-image.jpg".into(),
            size: "1.5 MB".into(),
            kind: FileKind::Image,
            upload_date: "2024-09-28".into(),
        },
    ]
}
