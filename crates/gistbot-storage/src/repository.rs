//! Repository for SQLite-backed gist persistence.
//!
//! All access goes through the Database struct using raw SQL. Gists are
//! immutable rows: the repository exposes insert, lookup, expired-candidate
//! listing, and delete, but no update path.

use std::sync::Arc;

use rusqlite::OptionalExtension;

use gistbot_core::error::GistbotError;
use gistbot_core::types::Gist;

use crate::db::Database;

/// Repository for gist rows.
pub struct GistRepository {
    db: Arc<Database>,
}

impl GistRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a new gist.
    ///
    /// The id is the external shareable handle, so a duplicate must be
    /// surfaced as `Conflict` rather than overwritten; the primary-key
    /// constraint makes the uniqueness check atomic with the insert.
    pub fn create(&self, gist: &Gist) -> Result<(), GistbotError> {
        if gist.id.is_empty() {
            return Err(GistbotError::Validation(
                "gist id must not be empty".to_string(),
            ));
        }

        self.db.with_conn(|conn| {
            let result = conn.execute(
                "INSERT INTO gists (id, content, sent_by, sent_at_unix_time, language, is_ephemeral)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    gist.id,
                    gist.content,
                    gist.sent_by,
                    gist.sent_at_unix_time,
                    gist.language,
                    gist.is_ephemeral as i64,
                ],
            );

            match result {
                Ok(_) => Ok(()),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    Err(GistbotError::Conflict {
                        id: gist.id.clone(),
                    })
                }
                Err(e) => Err(GistbotError::Storage(format!(
                    "Failed to save gist: {}",
                    e
                ))),
            }
        })
    }

    /// Find a gist by id, returning `None` when absent.
    pub fn find_by_id(&self, id: &str) -> Result<Option<Gist>, GistbotError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, content, sent_by, sent_at_unix_time, language, is_ephemeral
                     FROM gists WHERE id = ?1",
                )
                .map_err(|e| GistbotError::Storage(e.to_string()))?;

            let result = stmt
                .query_row(rusqlite::params![id], |row| Ok(row_to_gist(row)))
                .optional()
                .map_err(|e| GistbotError::Storage(e.to_string()))?;

            match result {
                Some(gist) => Ok(Some(gist?)),
                None => Ok(None),
            }
        })
    }

    /// Point lookup by id; an absent row is `NotFound`.
    pub fn get(&self, id: &str) -> Result<Gist, GistbotError> {
        self.find_by_id(id)?.ok_or_else(|| GistbotError::NotFound {
            id: id.to_string(),
        })
    }

    /// List ephemeral gists submitted before `older_than`, ascending by
    /// submission time.
    ///
    /// The predicate matches the partial index exactly, so the scan never
    /// touches non-ephemeral rows. The returned Vec is a point-in-time
    /// snapshot; rows may be deleted by the time the caller acts on them.
    pub fn list_expired_ephemeral(&self, older_than: i64) -> Result<Vec<Gist>, GistbotError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, content, sent_by, sent_at_unix_time, language, is_ephemeral
                     FROM gists
                     WHERE is_ephemeral > 0 AND sent_at_unix_time < ?1
                     ORDER BY sent_at_unix_time ASC",
                )
                .map_err(|e| GistbotError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![older_than], |row| Ok(row_to_gist(row)))
                .map_err(|e| GistbotError::Storage(e.to_string()))?;

            let mut gists = Vec::new();
            for row in rows {
                let gist = row.map_err(|e| GistbotError::Storage(e.to_string()))??;
                gists.push(gist);
            }
            Ok(gists)
        })
    }

    /// Delete a gist by id.
    ///
    /// Idempotent: deleting an absent id is not an error. Returns whether
    /// a row was actually removed.
    pub fn delete(&self, id: &str) -> Result<bool, GistbotError> {
        self.db.with_conn(|conn| {
            let removed = conn
                .execute("DELETE FROM gists WHERE id = ?1", rusqlite::params![id])
                .map_err(|e| GistbotError::Storage(format!("Failed to delete gist: {}", e)))?;
            Ok(removed > 0)
        })
    }

    /// Bulk-delete ephemeral gists submitted before `older_than`.
    ///
    /// One statement served by the partial index. Returns the number of
    /// rows removed.
    pub fn purge_expired(&self, older_than: i64) -> Result<usize, GistbotError> {
        self.db.with_conn(|conn| {
            let deleted = conn
                .execute(
                    "DELETE FROM gists WHERE is_ephemeral > 0 AND sent_at_unix_time < ?1",
                    rusqlite::params![older_than],
                )
                .map_err(|e| GistbotError::Storage(format!("Purge failed: {}", e)))?;
            Ok(deleted)
        })
    }

    /// Count total gists.
    pub fn count(&self) -> Result<u64, GistbotError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM gists", [], |row| row.get(0))
                .map_err(|e| GistbotError::Storage(e.to_string()))?;
            Ok(count as u64)
        })
    }
}

/// Convert a result row into a Gist.
///
/// Maps the stored 0/1 integer back to a bool; a NULL language column
/// becomes `None`, never an empty string.
fn row_to_gist(row: &rusqlite::Row<'_>) -> Result<Gist, GistbotError> {
    let id: String = row
        .get(0)
        .map_err(|e| GistbotError::Storage(e.to_string()))?;
    let content: String = row
        .get(1)
        .map_err(|e| GistbotError::Storage(e.to_string()))?;
    let sent_by: i64 = row
        .get(2)
        .map_err(|e| GistbotError::Storage(e.to_string()))?;
    let sent_at_unix_time: i64 = row
        .get(3)
        .map_err(|e| GistbotError::Storage(e.to_string()))?;
    let language: Option<String> = row
        .get(4)
        .map_err(|e| GistbotError::Storage(e.to_string()))?;
    let is_ephemeral: i64 = row
        .get(5)
        .map_err(|e| GistbotError::Storage(e.to_string()))?;

    Ok(Gist {
        id,
        content,
        sent_by,
        sent_at_unix_time,
        language,
        is_ephemeral: is_ephemeral != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn make_repo() -> GistRepository {
        GistRepository::new(Arc::new(Database::in_memory().unwrap()))
    }

    fn make_gist(id: &str, sent_at: i64, is_ephemeral: bool) -> Gist {
        Gist::new(
            id,
            "fn main() {}",
            42,
            sent_at,
            Some("rust".to_string()),
            is_ephemeral,
        )
    }

    #[test]
    fn test_create_and_get_round_trip() {
        let repo = make_repo();

        let gist = Gist::new(
            "ab12cd",
            "print('hi')",
            555,
            1_686_630_000,
            Some("python".to_string()),
            false,
        );
        repo.create(&gist).unwrap();

        let found = repo.get("ab12cd").unwrap();
        assert_eq!(found, gist);
    }

    #[test]
    fn test_get_nonexistent_is_not_found() {
        let repo = make_repo();
        let err = repo.get("missing").unwrap_err();
        assert!(matches!(err, GistbotError::NotFound { ref id } if id == "missing"));
    }

    #[test]
    fn test_find_by_id_nonexistent() {
        let repo = make_repo();
        assert!(repo.find_by_id("missing").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_id_is_conflict_and_first_row_wins() {
        let repo = make_repo();

        let first = make_gist("dup1", 1_700_000_000, false);
        repo.create(&first).unwrap();

        let mut second = make_gist("dup1", 1_700_000_999, true);
        second.content = "overwritten?".to_string();
        let err = repo.create(&second).unwrap_err();
        assert!(matches!(err, GistbotError::Conflict { ref id } if id == "dup1"));

        // Original row is untouched.
        let found = repo.get("dup1").unwrap();
        assert_eq!(found, first);
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_empty_id_is_validation_error() {
        let repo = make_repo();
        let gist = make_gist("", 1_700_000_000, false);
        let err = repo.create(&gist).unwrap_err();
        assert!(matches!(err, GistbotError::Validation(_)));
    }

    #[test]
    fn test_absent_language_reads_back_as_none() {
        let repo = make_repo();

        let gist = Gist::new("nolang", "body", 1, 1_700_000_000, None, false);
        repo.create(&gist).unwrap();

        let found = repo.get("nolang").unwrap();
        assert!(found.language.is_none());
    }

    #[test]
    fn test_ephemeral_flag_round_trips() {
        let repo = make_repo();

        repo.create(&make_gist("eph", 1_700_000_000, true)).unwrap();
        repo.create(&make_gist("perm", 1_700_000_001, false))
            .unwrap();

        assert!(repo.get("eph").unwrap().is_ephemeral);
        assert!(!repo.get("perm").unwrap().is_ephemeral);
    }

    #[test]
    fn test_list_expired_ephemeral_ordering_and_selectivity() {
        let repo = make_repo();

        let t1 = 1_700_000_100;
        let t2 = 1_700_000_200;
        let t3 = 1_700_000_300;

        // Insert out of order to exercise the ORDER BY.
        repo.create(&make_gist("e2", t2, true)).unwrap();
        repo.create(&make_gist("e1", t1, true)).unwrap();
        repo.create(&make_gist("e3", t3, true)).unwrap();
        // Non-ephemeral decoy inside the window.
        repo.create(&make_gist("keep", t2, false)).unwrap();

        let expired = repo.list_expired_ephemeral(t3).unwrap();
        let ids: Vec<&str> = expired.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e2"]);
    }

    #[test]
    fn test_list_expired_ephemeral_threshold_is_exclusive() {
        let repo = make_repo();
        repo.create(&make_gist("edge", 1_700_000_000, true)).unwrap();

        assert!(repo.list_expired_ephemeral(1_700_000_000).unwrap().is_empty());
        assert_eq!(repo.list_expired_ephemeral(1_700_000_001).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_then_get_is_not_found() {
        let repo = make_repo();

        repo.create(&make_gist("gone", 1_700_000_000, false))
            .unwrap();
        assert!(repo.delete("gone").unwrap());

        let err = repo.get("gone").unwrap_err();
        assert!(matches!(err, GistbotError::NotFound { .. }));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let repo = make_repo();

        repo.create(&make_gist("once", 1_700_000_000, false))
            .unwrap();
        assert!(repo.delete("once").unwrap());
        assert!(!repo.delete("once").unwrap());
        assert!(!repo.delete("never-existed").unwrap());
    }

    #[test]
    fn test_purge_expired_spares_permanent_and_recent() {
        let repo = make_repo();

        repo.create(&make_gist("old-eph", 1_700_000_000, true))
            .unwrap();
        repo.create(&make_gist("new-eph", 1_700_000_500, true))
            .unwrap();
        repo.create(&make_gist("old-perm", 1_700_000_000, false))
            .unwrap();

        let deleted = repo.purge_expired(1_700_000_400).unwrap();
        assert_eq!(deleted, 1);

        assert!(repo.find_by_id("old-eph").unwrap().is_none());
        assert!(repo.find_by_id("new-eph").unwrap().is_some());
        assert!(repo.find_by_id("old-perm").unwrap().is_some());
    }

    #[test]
    fn test_count() {
        let repo = make_repo();
        assert_eq!(repo.count().unwrap(), 0);

        repo.create(&make_gist("a1", 1_700_000_000, false)).unwrap();
        repo.create(&make_gist("a2", 1_700_000_001, true)).unwrap();
        assert_eq!(repo.count().unwrap(), 2);
    }

    #[test]
    fn test_generated_id_round_trip() {
        let repo = make_repo();

        let id = Gist::generate_id();
        let gist = Gist::new(id.clone(), "body", 9, 1_700_000_000, None, true);
        repo.create(&gist).unwrap();

        assert_eq!(repo.get(&id).unwrap().id, id);
    }
}
