use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One chat message as delivered by the relay API.
///
/// The relay forwards webhook events verbatim, so several fields are
/// optional: older rows have no numeric id, direct messages have no group,
/// and `messages` batches may omit `created_at` entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMessage {
    pub id: Option<i64>,
    #[serde(rename = "group_id")]
    pub group_id: Option<String>,
    #[serde(rename = "user_id")]
    pub user_id: Option<String>,
    #[serde(rename = "message")]
    pub text: String,
    #[serde(rename = "user_name")]
    pub user_name: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    #[serde(rename = "created_at")]
    pub created_at: Option<String>,
}

impl RawMessage {
    /// Timestamp as a chrono instant, for human-facing output.
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

/// One detected URL occurrence plus its resolution state.
///
/// Records are rebuilt from scratch on every refresh; ids are generated once
/// per record and never reused. Duplicate URLs across messages are kept as
/// independent records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRecord {
    pub id: Uuid,
    pub url: String,
    pub source_user: String,
    pub source_user_id: Option<String>,
    /// Epoch milliseconds of the originating message.
    pub timestamp: i64,
    /// Monotonic: once true it is never reset.
    pub is_image: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_image_url: Option<String>,
    /// Human label for where the preview came from (site name, place name, map).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_image_source: Option<String>,
}

impl LinkRecord {
    pub fn new(url: impl Into<String>, source_user: impl Into<String>, source_user_id: Option<String>, timestamp: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: url.into(),
            source_user: source_user.into(),
            source_user_id,
            timestamp,
            is_image: false,
            preview_image_url: None,
            preview_image_source: None,
        }
    }

    /// Eligible for metadata resolution: not a direct image and no preview yet.
    pub fn needs_preview(&self) -> bool {
        !self.is_image && self.preview_image_url.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_wire_shape_round_trips() {
        let json = r#"{
            "id": 42,
            "group_id": "g1",
            "user_id": "u1",
            "message": "hello https://example.com",
            "user_name": "Aki",
            "timestamp": 1700000000000,
            "created_at": "2023-11-14T22:13:20Z"
        }"#;
        let msg: RawMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.text, "hello https://example.com");
        assert_eq!(msg.user_name, "Aki");
        assert_eq!(msg.group_id.as_deref(), Some("g1"));
        assert!(msg.sent_at().is_some());
    }

    #[test]
    fn message_tolerates_missing_optionals() {
        let json = r#"{"message": "hi", "user_name": "Aki", "timestamp": 0}"#;
        let msg: RawMessage = serde_json::from_str(json).unwrap();
        assert!(msg.id.is_none());
        assert!(msg.group_id.is_none());
        assert!(msg.created_at.is_none());
    }

    #[test]
    fn fresh_records_need_previews() {
        let rec = LinkRecord::new("https://example.com", "Aki", None, 0);
        assert!(rec.needs_preview());
        assert!(!rec.is_image);
        assert!(rec.preview_image_url.is_none());
    }

    #[test]
    fn record_ids_are_unique() {
        let a = LinkRecord::new("https://example.com", "Aki", None, 0);
        let b = LinkRecord::new("https://example.com", "Aki", None, 0);
        assert_ne!(a.id, b.id);
    }
}
