//! Sentiment over time, for the history view.

use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentPoint {
    pub entry_id: String,
    pub created_at: String,
    pub sentiment_score: f64,
    pub mood: String,
    pub color: String,
}

#[derive(Debug, Serialize)]
pub struct SentimentHistory {
    /// Analysed entries, oldest first.
    pub points: Vec<SentimentPoint>,
    /// Mean sentiment score, 0 when nothing has been analysed.
    pub average: f64,
}

pub fn sentiment_history(conn: &Connection) -> Result<SentimentHistory> {
    let mut stmt = conn.prepare(
        "SELECT e.id, e.created_at, a.sentiment_score, a.mood, a.color \
         FROM analyses a JOIN journal_entries e ON e.id = a.entry_id \
         ORDER BY e.created_at ASC, e.id ASC",
    )?;
    let points = stmt
        .query_map([], |row| {
            Ok(SentimentPoint {
                entry_id: row.get(0)?,
                created_at: row.get(1)?,
                sentiment_score: row.get(2)?,
                mood: row.get(3)?,
                color: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let average = if points.is_empty() {
        0.0
    } else {
        points.iter().map(|p| p.sentiment_score).sum::<f64>() / points.len() as f64
    };

    Ok(SentimentHistory { points, average })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::journal::store::{create_entry, upsert_analysis};
    use crate::journal::types::Analysis;

    fn analysis(score: f64) -> Analysis {
        Analysis {
            sentiment_score: score,
            mood: "m".into(),
            summary: "s".into(),
            subject: "s".into(),
            negative: score < 0.0,
            color: "#000000".into(),
        }
    }

    #[test]
    fn empty_history_has_zero_average() {
        let conn = open_memory_database().unwrap();
        let history = sentiment_history(&conn).unwrap();
        assert!(history.points.is_empty());
        assert_eq!(history.average, 0.0);
    }

    #[test]
    fn history_skips_unanalysed_entries_and_averages() {
        let conn = open_memory_database().unwrap();
        let a = create_entry(&conn, "a").unwrap();
        let b = create_entry(&conn, "b").unwrap();
        let _c = create_entry(&conn, "c").unwrap();
        upsert_analysis(&conn, &a.id, &analysis(6.0), None).unwrap();
        upsert_analysis(&conn, &b.id, &analysis(-2.0), None).unwrap();

        let history = sentiment_history(&conn).unwrap();
        assert_eq!(history.points.len(), 2);
        assert_eq!(history.points[0].entry_id, a.id);
        assert_eq!(history.points[1].entry_id, b.id);
        assert!((history.average - 2.0).abs() < 1e-9);
    }
}
