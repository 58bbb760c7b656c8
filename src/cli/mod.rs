pub mod ask;
pub mod entries;

use anyhow::Result;
use rusqlite::Connection;

use mood_journal::config::MoodJournalConfig;

/// Open the configured journal database.
fn open_db(config: &MoodJournalConfig) -> Result<Connection> {
    mood_journal::db::open_database(config.resolved_db_path())
}
