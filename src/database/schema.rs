/*!
 * SQLite schema for files, vocabulary, the meaning cache and quiz history.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Applied on every open; these settings are per connection
const CONNECTION_PRAGMAS: &str = "PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;";

const TABLES: &str = r#"
    CREATE TABLE IF NOT EXISTS schema_version (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        version INTEGER NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS subtitle_files (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        filename TEXT NOT NULL,
        file_size INTEGER NOT NULL,
        content_hash TEXT NOT NULL,
        upload_date TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_subtitle_files_user ON subtitle_files(user_id);
    CREATE INDEX IF NOT EXISTS idx_subtitle_files_hash ON subtitle_files(content_hash);

    CREATE TABLE IF NOT EXISTS vocabulary (
        id TEXT PRIMARY KEY,
        file_id TEXT NOT NULL REFERENCES subtitle_files(id) ON DELETE CASCADE,
        word TEXT NOT NULL,
        reading TEXT NOT NULL,
        meaning TEXT NOT NULL,
        context_sentence TEXT NOT NULL,
        frequency INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_vocabulary_file ON vocabulary(file_id);

    CREATE TABLE IF NOT EXISTS dictionary_cache (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        word TEXT NOT NULL UNIQUE,
        meaning TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_dictionary_cache_created ON dictionary_cache(created_at);

    CREATE TABLE IF NOT EXISTS quiz_attempts (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        file_id TEXT NOT NULL REFERENCES subtitle_files(id) ON DELETE CASCADE,
        score INTEGER NOT NULL,
        total_words INTEGER NOT NULL,
        completed_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_quiz_attempts_user ON quiz_attempts(user_id, completed_at);

    CREATE TABLE IF NOT EXISTS quiz_items (
        id TEXT PRIMARY KEY,
        vocabulary_id TEXT NOT NULL UNIQUE REFERENCES vocabulary(id) ON DELETE CASCADE,
        attempts INTEGER NOT NULL DEFAULT 0,
        correct INTEGER NOT NULL DEFAULT 0,
        last_reviewed TEXT NOT NULL
    );
"#;

/// Apply connection settings and create any missing tables.
///
/// Every statement is `IF NOT EXISTS`, so an older database is brought up
/// to date by running the same batch again.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(CONNECTION_PRAGMAS)?;

    let version = get_schema_version(conn)?;
    if version >= SCHEMA_VERSION {
        debug!("Database schema is up to date (v{})", version);
        return Ok(());
    }

    info!("Creating database schema v{} (found v{})", SCHEMA_VERSION, version);
    conn.execute_batch(TABLES).context("Failed to create database tables")?;
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version, updated_at) VALUES (1, ?1, datetime('now'))",
        [SCHEMA_VERSION],
    )?;

    Ok(())
}

/// Stored schema version, 0 for a fresh database
fn get_schema_version(conn: &Connection) -> Result<i32> {
    let has_table: bool = conn
        .query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='schema_version'",
            [],
            |row| row.get(0),
        )
        .context("Failed to look up schema_version table")?;

    if !has_table {
        return Ok(0);
    }

    Ok(conn
        .query_row("SELECT version FROM schema_version WHERE id = 1", [], |row| row.get(0))
        .unwrap_or(0))
}
