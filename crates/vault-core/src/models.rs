use serde::{Deserialize, Serialize};

/// The authenticated principal as known to the client.
///
/// `refresh_token` is the opaque accessor handed out by the identity
/// provider; it is exchanged for a fresh bearer token before every
/// backend request and never sent to the backend itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub refresh_token: String,
}

/// Short-lived credential attached to backend requests.
///
/// Minted immediately before use; holding one across requests is not
/// supported since tokens expire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Tri-state authentication status.
///
/// `Unknown` lasts from startup until the provider's first report; no
/// routing decision may be made while in it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Unknown,
    Authenticated(Identity),
    Unauthenticated,
}

impl SessionState {
    /// True once the provider has reported, i.e. the state is no longer
    /// `Unknown` and the UI may route on it.
    pub fn is_settled(&self) -> bool {
        !matches!(self, SessionState::Unknown)
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }
}

/// File type tag used for icon selection only. Inferred from backend
/// data, never validated against content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Document,
    Image,
    Video,
    Audio,
    Archive,
    #[serde(other)]
    Other,
}

/// One stored file as reported by the backend listing.
///
/// All fields are display strings kept exactly as the backend sends
/// them; records are materialized fresh on every fetch and never merged
/// with a previous listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: String,
    pub name: String,
    pub size: String,
    #[serde(rename = "type")]
    pub kind: FileKind,
    pub upload_date: String,
}

/// Backend acknowledgement for an upload. The shape is backend-defined;
/// at minimum it echoes the identifier and name, so every field is
/// optional here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_state_settles_only_after_report() {
        assert!(!SessionState::Unknown.is_settled());
        assert!(SessionState::Unauthenticated.is_settled());
        let identity = Identity {
            user_id: "u1".into(),
            email: "a@b.c".into(),
            refresh_token: "rt".into(),
        };
        let state = SessionState::Authenticated(identity.clone());
        assert!(state.is_settled());
        assert_eq!(state.identity(), Some(&identity));
        assert_eq!(SessionState::Unauthenticated.identity(), None);
    }

    #[test]
    fn file_record_parses_backend_shape() {
        let record: FileRecord = serde_json::from_str(
            r#"{"id":"1","name":"report.pdf","size":"2.1 MB","type":"pdf","upload_date":"2024-09-28"}"#,
        )
        .unwrap();
        assert_eq!(record.kind, FileKind::Pdf);
        assert_eq!(record.size, "2.1 MB");
    }

    #[test]
    fn unknown_type_tag_maps_to_other() {
        let record: FileRecord = serde_json::from_str(
            r#"{"id":"9","name":"x","size":"1 KB","type":"spreadsheet","upload_date":"2024-01-01"}"#,
        )
        .unwrap();
        assert_eq!(record.kind, FileKind::Other);
    }

    #[test]
    fn file_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&FileKind::Pdf).unwrap(), "\"pdf\"");
        assert_eq!(serde_json::to_string(&FileKind::Image).unwrap(), "\"image\"");
    }

    #[test]
    fn upload_receipt_tolerates_sparse_bodies() {
        let receipt: UploadReceipt = serde_json::from_str(r#"{"id":"42"}"#).unwrap();
        assert_eq!(receipt.id.as_deref(), Some("42"));
        assert!(receipt.name.is_none());

        let empty: UploadReceipt = serde_json::from_str("{}").unwrap();
        assert!(empty.id.is_none());
    }
}
