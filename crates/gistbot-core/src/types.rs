use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of hex characters taken from a v4 UUID to form a gist handle.
const GIST_ID_LEN: usize = 8;

/// A stored, user-submitted text snippet.
///
/// Gists are immutable after creation: the only lifecycle transitions are
/// insert and delete. The `id` doubles as the external lookup handle (a
/// shareable short link), so it never changes once assigned.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gist {
    /// Short alphanumeric handle, globally unique.
    pub id: String,
    /// The snippet body.
    pub content: String,
    /// Messaging-platform user id of the submitter. Not a foreign key;
    /// the identity space is managed outside this system.
    pub sent_by: i64,
    /// Submission time in unix seconds. Immutable once set.
    pub sent_at_unix_time: i64,
    /// Optional language/syntax tag for display. Absent is not the same
    /// as an empty string.
    pub language: Option<String>,
    /// When true, the gist is a deletion candidate once it ages past the
    /// configured retention threshold.
    pub is_ephemeral: bool,
}

impl Gist {
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        sent_by: i64,
        sent_at_unix_time: i64,
        language: Option<String>,
        is_ephemeral: bool,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            sent_by,
            sent_at_unix_time,
            language,
            is_ephemeral,
        }
    }

    /// Submission time as a `DateTime<Utc>`.
    ///
    /// Returns `None` if the stored unix timestamp falls outside the range
    /// chrono can represent.
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.sent_at_unix_time, 0).single()
    }

    /// Generate a fresh short alphanumeric gist handle.
    ///
    /// Draws from a v4 UUID and keeps the first eight hex characters.
    /// Collisions are possible at this length; `create` rejects them at
    /// insert time, so callers should regenerate and retry on conflict.
    pub fn generate_id() -> String {
        let hex = Uuid::new_v4().simple().to_string();
        hex[..GIST_ID_LEN].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gist_new_populates_fields() {
        let gist = Gist::new(
            "ab12cd",
            "print('hi')",
            555,
            1_686_630_000,
            Some("python".to_string()),
            false,
        );
        assert_eq!(gist.id, "ab12cd");
        assert_eq!(gist.content, "print('hi')");
        assert_eq!(gist.sent_by, 555);
        assert_eq!(gist.sent_at_unix_time, 1_686_630_000);
        assert_eq!(gist.language.as_deref(), Some("python"));
        assert!(!gist.is_ephemeral);
    }

    #[test]
    fn test_sent_at_matches_unix_time() {
        let gist = Gist::new("ab12cd", "x", 1, 1_686_630_000, None, false);
        let sent_at = gist.sent_at().unwrap();
        assert_eq!(sent_at.timestamp(), 1_686_630_000);
    }

    #[test]
    fn test_generate_id_shape() {
        let id = Gist::generate_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(id, id.to_lowercase());
    }

    #[test]
    fn test_generate_id_varies() {
        let a = Gist::generate_id();
        let b = Gist::generate_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_gist_serde_round_trip() {
        let gist = Gist::new("ab12cd", "body", 7, 1_700_000_000, None, true);
        let encoded = toml::to_string(&gist).unwrap();
        let decoded: Gist = toml::from_str(&encoded).unwrap();
        assert_eq!(decoded, gist);
    }
}
