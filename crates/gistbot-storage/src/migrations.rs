//! Database schema migrations.
//!
//! Applies the initial schema: the gists table and the partial index that
//! serves the expired-ephemeral sweep.

use rusqlite::Connection;
use tracing::info;

use gistbot_core::error::GistbotError;

/// Run all pending database migrations.
///
/// Currently implements the initial schema (version 1). Future migrations
/// can be added by checking the current version and applying incremental changes.
pub fn run_migrations(conn: &Connection) -> Result<(), GistbotError> {
    // Create the migrations tracking table first.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| GistbotError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| GistbotError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: initial_schema");
    }

    Ok(())
}

/// Version 1: Initial schema.
///
/// `is_ephemeral` is stored as an integer 0/1; the repository maps it to a
/// proper bool at the boundary. The index is partial: it covers ephemeral
/// rows only, so sweep-candidate scans never touch permanent gists.
fn apply_v1(conn: &Connection) -> Result<(), GistbotError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS gists (
            id                 TEXT PRIMARY KEY NOT NULL,
            content            TEXT NOT NULL,
            sent_by            INTEGER NOT NULL,
            sent_at_unix_time  INTEGER NOT NULL,
            language           TEXT,
            is_ephemeral       INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_gists_ephemeral_sent_at
            ON gists (is_ephemeral, sent_at_unix_time)
            WHERE is_ephemeral > 0;

        -- Record migration.
        INSERT OR IGNORE INTO schema_migrations (version, name) VALUES (1, 'initial_schema');
        ",
    )
    .map_err(|e| GistbotError::Storage(format!("Failed to apply migration v1: {}", e)))?;

    Ok(())
}
