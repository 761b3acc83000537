use wordday_core::db::migrations::latest_version;
use wordday_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "words");
    assert_table_exists(&conn, "daily_words");
    assert_table_exists(&conn, "words_hebrew");
    assert_table_exists(&conn, "daily_words_hebrew");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("words.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute("INSERT INTO words (word) VALUES ('kept');", [])
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM words;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn ledger_rejects_second_row_for_same_date() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO words (word) VALUES ('alpha'), ('beta');
         INSERT INTO daily_words (date, word_id) VALUES ('2024-01-01', 1);",
    )
    .unwrap();

    let duplicate = conn.execute(
        "INSERT INTO daily_words (date, word_id) VALUES ('2024-01-01', 2);",
        [],
    );
    assert!(duplicate.is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
