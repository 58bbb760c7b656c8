mod helpers;

use helpers::test_db;
use mood_journal::db;
use mood_journal::journal::store::{create_entry, get_entry, list_entries, update_entry};
use tempfile::TempDir;

#[test]
fn open_creates_new_db_at_nonexistent_path() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("subdir").join("journal.db");
    assert!(!db_path.exists());

    let conn = db::open_database(&db_path).unwrap();
    assert!(db_path.exists());

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM journal_entries", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
    assert_eq!(
        db::migrations::get_schema_version(&conn).unwrap(),
        db::migrations::CURRENT_SCHEMA_VERSION
    );
}

#[test]
fn busy_timeout_is_set() {
    let tmp = TempDir::new().unwrap();
    let conn = db::open_database(tmp.path().join("journal.db")).unwrap();

    let timeout: i64 = conn
        .pragma_query_value(None, "busy_timeout", |row| row.get(0))
        .unwrap();
    assert_eq!(timeout, 5000);
}

#[test]
fn entries_survive_reopen() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("journal.db");

    let id = {
        let conn = db::open_database(&path).unwrap();
        create_entry(&conn, "Persisted thought").unwrap().id
    };

    let conn = db::open_database(&path).unwrap();
    let entry = get_entry(&conn, &id).unwrap().unwrap();
    assert_eq!(entry.content, "Persisted thought");
}

#[test]
fn list_is_newest_first() {
    let conn = test_db();
    let first = create_entry(&conn, "first").unwrap();
    let second = create_entry(&conn, "second").unwrap();
    let third = create_entry(&conn, "third").unwrap();

    let ids: Vec<String> = list_entries(&conn).unwrap().into_iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![third.id, second.id, first.id]);
}

#[test]
fn update_replaces_content_and_bumps_timestamp() {
    let conn = test_db();
    let entry = create_entry(&conn, "draft").unwrap();

    let updated = update_entry(&conn, &entry.id, "final").unwrap().unwrap();
    assert_eq!(updated.id, entry.id);
    assert_eq!(updated.content, "final");
    assert_eq!(updated.created_at, entry.created_at);
    assert!(updated.updated_at >= entry.updated_at);
}
