//! Entry and analysis persistence.
//!
//! Entries are keyed by UUID v7 and listed newest first. Each entry has at
//! most one analysis row, replaced whenever the entry is re-analysed and
//! removed with the entry via `ON DELETE CASCADE`.

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::journal::types::{Analysis, EntryWithAnalysis, JournalEntry};

const ENTRY_COLUMNS: &str = "id, content, created_at, updated_at";

/// Fixed-width UTC timestamp, so string order is time order.
fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<JournalEntry> {
    Ok(JournalEntry {
        id: row.get(0)?,
        content: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
    })
}

fn analysis_from_row(row: &Row<'_>) -> rusqlite::Result<Analysis> {
    Ok(Analysis {
        sentiment_score: row.get(0)?,
        mood: row.get(1)?,
        summary: row.get(2)?,
        subject: row.get(3)?,
        negative: row.get(4)?,
        color: row.get(5)?,
    })
}

/// Insert a new entry and return it.
pub fn create_entry(conn: &Connection, content: &str) -> Result<JournalEntry> {
    let id = uuid::Uuid::now_v7().to_string();
    let now = timestamp();

    conn.execute(
        "INSERT INTO journal_entries (id, content, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
        params![id, content, now],
    )?;

    tracing::debug!(id = %id, content_len = content.len(), "journal entry created");

    Ok(JournalEntry {
        id,
        content: content.to_string(),
        created_at: now.clone(),
        updated_at: now,
    })
}

pub fn get_entry(conn: &Connection, id: &str) -> Result<Option<JournalEntry>> {
    let entry = conn
        .query_row(
            &format!("SELECT {ENTRY_COLUMNS} FROM journal_entries WHERE id = ?1"),
            params![id],
            entry_from_row,
        )
        .optional()?;
    Ok(entry)
}

/// All entries, newest first. Ties on `created_at` fall back to id order,
/// which is also time-ordered for UUID v7.
pub fn list_entries(conn: &Connection) -> Result<Vec<JournalEntry>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ENTRY_COLUMNS} FROM journal_entries ORDER BY created_at DESC, id DESC"
    ))?;
    let entries = stmt
        .query_map([], entry_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}

/// Replace an entry's content. Returns `None` if the entry does not exist.
pub fn update_entry(conn: &Connection, id: &str, content: &str) -> Result<Option<JournalEntry>> {
    let now = timestamp();
    let changed = conn.execute(
        "UPDATE journal_entries SET content = ?1, updated_at = ?2 WHERE id = ?3",
        params![content, now, id],
    )?;
    if changed == 0 {
        return Ok(None);
    }
    get_entry(conn, id)
}

/// Delete an entry and its analysis. Returns `false` if nothing was deleted.
pub fn delete_entry(conn: &Connection, id: &str) -> Result<bool> {
    let changed = conn.execute("DELETE FROM journal_entries WHERE id = ?1", params![id])?;
    Ok(changed > 0)
}

/// Insert or replace the analysis for an entry.
pub fn upsert_analysis(
    conn: &Connection,
    entry_id: &str,
    analysis: &Analysis,
    model: Option<&str>,
) -> Result<()> {
    let now = timestamp();
    conn.execute(
        "INSERT INTO analyses (entry_id, sentiment_score, mood, summary, subject, negative, color, updated_at, model) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) \
         ON CONFLICT(entry_id) DO UPDATE SET \
            sentiment_score = excluded.sentiment_score, \
            mood = excluded.mood, \
            summary = excluded.summary, \
            subject = excluded.subject, \
            negative = excluded.negative, \
            color = excluded.color, \
            updated_at = excluded.updated_at, \
            model = excluded.model",
        params![
            entry_id,
            analysis.sentiment_score,
            analysis.mood,
            analysis.summary,
            analysis.subject,
            analysis.negative,
            analysis.color,
            now,
            model,
        ],
    )?;
    Ok(())
}

/// Remove an entry's analysis, leaving the entry itself. Returns `false` if
/// there was none.
pub fn delete_analysis(conn: &Connection, entry_id: &str) -> Result<bool> {
    let changed = conn.execute("DELETE FROM analyses WHERE entry_id = ?1", params![entry_id])?;
    Ok(changed > 0)
}

pub fn get_analysis(conn: &Connection, entry_id: &str) -> Result<Option<Analysis>> {
    let analysis = conn
        .query_row(
            "SELECT sentiment_score, mood, summary, subject, negative, color FROM analyses WHERE entry_id = ?1",
            params![entry_id],
            analysis_from_row,
        )
        .optional()?;
    Ok(analysis)
}

pub fn get_entry_with_analysis(conn: &Connection, id: &str) -> Result<Option<EntryWithAnalysis>> {
    let Some(entry) = get_entry(conn, id)? else {
        return Ok(None);
    };
    let analysis = get_analysis(conn, &entry.id)?;
    Ok(Some(EntryWithAnalysis { entry, analysis }))
}

/// All entries with their analyses, newest first.
pub fn list_entries_with_analysis(conn: &Connection) -> Result<Vec<EntryWithAnalysis>> {
    let mut stmt = conn.prepare(
        "SELECT e.id, e.content, e.created_at, e.updated_at, \
                a.sentiment_score, a.mood, a.summary, a.subject, a.negative, a.color \
         FROM journal_entries e LEFT JOIN analyses a ON a.entry_id = e.id \
         ORDER BY e.created_at DESC, e.id DESC",
    )?;
    let rows = stmt
        .query_map([], |row| {
            let entry = entry_from_row(row)?;
            let score: Option<f64> = row.get(4)?;
            let analysis = match score {
                Some(sentiment_score) => Some(Analysis {
                    sentiment_score,
                    mood: row.get(5)?,
                    summary: row.get(6)?,
                    subject: row.get(7)?,
                    negative: row.get(8)?,
                    color: row.get(9)?,
                }),
                None => None,
            };
            Ok(EntryWithAnalysis { entry, analysis })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
