//! Book repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/read/update/delete primitives over the `books` table.
//! - Keep SQL and row decoding inside the persistence boundary.
//!
//! # Invariants
//! - No business rules: callers hand in already-validated records.
//! - ISBN uniqueness is still enforced by storage (`UNIQUE` index), so two
//!   racing writers cannot both persist the same ISBN.
//! - Read paths reject malformed rows instead of masking them.

use crate::db::DbError;
use crate::model::book::{now_utc, Book, BookId, NewBook};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const BOOK_SELECT_SQL: &str = "SELECT
    id,
    title,
    author,
    publication_year,
    genre,
    isbn,
    description,
    created_at,
    updated_at
FROM books";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for book persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Target row does not exist.
    NotFound(BookId),
    /// Another row already holds this ISBN.
    DuplicateIsbn(String),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "book not found: {id}"),
            Self::DuplicateIsbn(isbn) => write!(f, "isbn already stored: {isbn}"),
            Self::InvalidData(message) => write!(f, "invalid persisted book data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract for books.
///
/// Any engine (SQLite table, in-memory map) may implement it. Implementations
/// serialize their own conflicting writes.
pub trait BookRepository {
    /// Persists `draft` under a fresh id with `created_at = updated_at = now`.
    fn create(&self, draft: &NewBook) -> RepoResult<Book>;
    fn get_by_id(&self, id: BookId) -> RepoResult<Option<Book>>;
    /// Looks up by normalized ISBN.
    fn get_by_isbn(&self, isbn: &str) -> RepoResult<Option<Book>>;
    /// All books ordered by id ascending (creation order).
    fn list_all(&self) -> RepoResult<Vec<Book>>;
    /// Replaces every mutable field of `book.id`, including `updated_at`,
    /// and returns the stored record. `created_at` is never rewritten.
    ///
    /// Returns `RepoError::NotFound` when the row is missing.
    fn update(&self, book: &Book) -> RepoResult<Book>;
    /// Hard-deletes a row. Returns whether a row was removed.
    fn delete(&self, id: BookId) -> RepoResult<bool>;
}

/// SQLite-backed book repository.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn create(&self, draft: &NewBook) -> RepoResult<Book> {
        let now = now_utc();
        let stamp = timestamp_to_db(now);

        self.conn
            .execute(
                "INSERT INTO books (
                    title,
                    author,
                    publication_year,
                    genre,
                    isbn,
                    description,
                    created_at,
                    updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
                params![
                    draft.title.as_str(),
                    draft.author.as_str(),
                    draft.publication_year,
                    draft.genre.as_str(),
                    draft.isbn.as_deref(),
                    draft.description.as_deref(),
                    stamp.as_str(),
                    stamp.as_str(),
                ],
            )
            .map_err(|err| map_write_error(err, draft.isbn.as_deref()))?;

        let id = self.conn.last_insert_rowid();
        Ok(Book::from_draft(id, draft.clone(), now))
    }

    fn get_by_id(&self, id: BookId) -> RepoResult<Option<Book>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{BOOK_SELECT_SQL} WHERE id = ?1;"))?;
        let row = stmt.query_row([id], read_row).optional()?;
        row.map(parse_book_row).transpose()
    }

    fn get_by_isbn(&self, isbn: &str) -> RepoResult<Option<Book>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{BOOK_SELECT_SQL} WHERE isbn = ?1;"))?;
        let row = stmt.query_row([isbn], read_row).optional()?;
        row.map(parse_book_row).transpose()
    }

    fn list_all(&self) -> RepoResult<Vec<Book>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{BOOK_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut books = Vec::new();

        while let Some(row) = rows.next()? {
            books.push(parse_book_row(read_row(row)?)?);
        }

        Ok(books)
    }

    fn update(&self, book: &Book) -> RepoResult<Book> {
        let changed = self
            .conn
            .execute(
                "UPDATE books
                 SET
                    title = ?1,
                    author = ?2,
                    publication_year = ?3,
                    genre = ?4,
                    isbn = ?5,
                    description = ?6,
                    updated_at = ?7
                 WHERE id = ?8;",
                params![
                    book.title.as_str(),
                    book.author.as_str(),
                    book.publication_year,
                    book.genre.as_str(),
                    book.isbn.as_deref(),
                    book.description.as_deref(),
                    timestamp_to_db(book.updated_at),
                    book.id,
                ],
            )
            .map_err(|err| map_write_error(err, book.isbn.as_deref()))?;

        if changed == 0 {
            return Err(RepoError::NotFound(book.id));
        }

        self.get_by_id(book.id)?.ok_or(RepoError::NotFound(book.id))
    }

    fn delete(&self, id: BookId) -> RepoResult<bool> {
        let changed = self.conn.execute("DELETE FROM books WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }
}

/// Raw column values, decoded before any domain parsing.
struct BookRow {
    id: BookId,
    title: String,
    author: String,
    publication_year: i32,
    genre: String,
    isbn: Option<String>,
    description: Option<String>,
    created_at: String,
    updated_at: String,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<BookRow> {
    Ok(BookRow {
        id: row.get("id")?,
        title: row.get("title")?,
        author: row.get("author")?,
        publication_year: row.get("publication_year")?,
        genre: row.get("genre")?,
        isbn: row.get("isbn")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_book_row(row: BookRow) -> RepoResult<Book> {
    let created_at = parse_timestamp(&row.created_at, "created_at")?;
    let updated_at = parse_timestamp(&row.updated_at, "updated_at")?;

    Ok(Book {
        id: row.id,
        title: row.title,
        author: row.author,
        publication_year: row.publication_year,
        genre: row.genre,
        isbn: row.isbn,
        description: row.description,
        created_at,
        updated_at,
    })
}

fn timestamp_to_db(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str, column: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| {
            RepoError::InvalidData(format!("invalid timestamp `{value}` in books.{column}"))
        })
}

fn map_write_error(err: rusqlite::Error, isbn: Option<&str>) -> RepoError {
    match (&err, isbn) {
        (rusqlite::Error::SqliteFailure(failure, _), Some(isbn))
            if failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            RepoError::DuplicateIsbn(isbn.to_string())
        }
        _ => err.into(),
    }
}
