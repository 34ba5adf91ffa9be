use bookshelf_core::db::migrations::latest_version;
use bookshelf_core::db::{open_db, open_db_in_memory, DbError, StoreLocation};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "books");
}

#[test]
fn in_memory_databases_are_independent() {
    let first = open_db_in_memory().unwrap();
    let second = open_db_in_memory().unwrap();

    first
        .execute_batch(
            "INSERT INTO books (title, author, publication_year, genre, created_at, updated_at)
             VALUES ('Dune', 'Frank Herbert', 1965, 'Science Fiction',
                     '2024-01-01T12:00:00.000000Z', '2024-01-01T12:00:00.000000Z');",
        )
        .unwrap();

    assert_eq!(book_count(&first), 1);
    assert_eq!(book_count(&second), 0);
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("books.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "books");
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
fn opening_unreachable_path_reports_store_location() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("books.db");

    let err = open_db(&path).unwrap_err();
    assert!(err.to_string().contains("missing"));
    match err {
        DbError::Open { location, .. } => {
            assert_eq!(location, StoreLocation::File(path.clone()));
            assert_eq!(location.mode(), "file");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!path.exists());
}

#[test]
fn schema_rejects_updated_at_before_created_at() {
    let conn = open_db_in_memory().unwrap();

    let result = conn.execute_batch(
        "INSERT INTO books (title, author, publication_year, genre, created_at, updated_at)
         VALUES ('Dune', 'Frank Herbert', 1965, 'Science Fiction',
                 '2024-01-02T00:00:00.000000Z', '2024-01-01T00:00:00.000000Z');",
    );

    assert!(result.is_err());
    assert_eq!(book_count(&conn), 0);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn book_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM books;", [], |row| row.get(0))
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
