//! SQL DDL for the journal tables.
//!
//! Defines `journal_entries`, `analyses` (one row per entry) and
//! `schema_meta`. All DDL uses `IF NOT EXISTS` for idempotent initialization.

use rusqlite::Connection;

const SCHEMA_SQL: &str = r#"
-- Journal entries
CREATE TABLE IF NOT EXISTS journal_entries (
    id TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_entries_created ON journal_entries(created_at);

-- Model analysis of an entry, replaced on re-analysis
CREATE TABLE IF NOT EXISTS analyses (
    entry_id TEXT PRIMARY KEY REFERENCES journal_entries(id) ON DELETE CASCADE,
    sentiment_score REAL NOT NULL CHECK(sentiment_score >= -10.0 AND sentiment_score <= 10.0),
    mood TEXT NOT NULL,
    summary TEXT NOT NULL,
    subject TEXT NOT NULL,
    negative INTEGER NOT NULL CHECK(negative IN (0, 1)),
    color TEXT NOT NULL,
    model TEXT,
    updated_at TEXT NOT NULL
);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}
