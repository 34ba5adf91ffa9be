//! Book use-case service.
//!
//! # Responsibility
//! - Provide create/get/list/update/delete entry points for callers.
//! - Enforce cross-row rules (ISBN uniqueness, existence) around repository
//!   calls and translate storage outcomes into domain errors.
//! - Map domain errors onto HTTP-equivalent statuses and response bodies.
//!
//! # Invariants
//! - A payload is fully validated before any conflict lookup, so a bad
//!   payload always reports `Validation` even if its ISBN is also taken.
//! - `update_book`/`delete_book` check existence before anything else.
//! - The service keeps no state besides its injected repository.

use crate::model::book::{now_utc, Book, BookId, BookPayload};
use crate::model::validation::{validate_payload, BookField, ValidationError};
use crate::repo::book_repo::{BookRepository, RepoError};
use log::{debug, error, info};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, BookServiceError>;

/// Service error for book use-cases.
#[derive(Debug)]
pub enum BookServiceError {
    /// Payload failed field validation.
    Validation(ValidationError),
    /// Target book does not exist.
    NotFound(BookId),
    /// Another book already holds this normalized ISBN.
    Conflict { isbn: String },
    /// Persistence-layer failure unrelated to the request content.
    Storage(RepoError),
}

impl BookServiceError {
    /// HTTP status the router must answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 422,
            Self::NotFound(_) => 404,
            Self::Conflict { .. } => 409,
            Self::Storage(_) => 500,
        }
    }

    /// Short stable code for logs and machine consumers.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::NotFound(_) => "book_not_found",
            Self::Conflict { .. } => "duplicate_isbn",
            Self::Storage(_) => "storage_failed",
        }
    }

    /// Response body for this error.
    ///
    /// Storage failures are reported generically; details go to the log.
    pub fn to_response(&self) -> ErrorResponse {
        match self {
            Self::Validation(err) => ErrorResponse {
                detail: "invalid book payload".to_string(),
                errors: err
                    .violations()
                    .iter()
                    .map(|violation| FieldErrorDetail {
                        field: violation.field,
                        message: violation.reason.to_string(),
                    })
                    .collect(),
            },
            Self::NotFound(id) => ErrorResponse {
                detail: format!("Book with id {id} not found"),
                errors: Vec::new(),
            },
            Self::Conflict { isbn } => ErrorResponse {
                detail: format!("Book with ISBN {isbn} already exists"),
                errors: vec![FieldErrorDetail {
                    field: BookField::Isbn,
                    message: "already used by another book".to_string(),
                }],
            },
            Self::Storage(_) => ErrorResponse {
                detail: "internal storage error".to_string(),
                errors: Vec::new(),
            },
        }
    }
}

impl Display for BookServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "book not found: {id}"),
            Self::Conflict { isbn } => write!(f, "duplicate isbn: {isbn}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BookServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for BookServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for BookServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::DuplicateIsbn(isbn) => Self::Conflict { isbn },
            other => Self::Storage(other),
        }
    }
}

/// Error response body: `{ "detail": ..., "errors": [{ "field", "message" }] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
    /// Per-field problems; omitted when empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldErrorDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldErrorDetail {
    pub field: BookField,
    pub message: String,
}

/// Use-case service over an injected book repository.
pub struct BookService<R: BookRepository> {
    repo: R,
}

impl<R: BookRepository> BookService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Borrows the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Validates and persists a new book.
    ///
    /// # Errors
    /// - `Validation` when any field is invalid.
    /// - `Conflict` when the normalized ISBN is already stored.
    pub fn create_book(&self, payload: &BookPayload) -> ServiceResult<Book> {
        let result = self.create_book_inner(payload);
        match &result {
            Ok(book) => info!(
                "event=book_create module=service status=ok book_id={}",
                book.id
            ),
            Err(err) => log_failure("book_create", None, err),
        }
        result
    }

    fn create_book_inner(&self, payload: &BookPayload) -> ServiceResult<Book> {
        let draft = validate_payload(payload)?;

        if let Some(isbn) = draft.isbn.as_deref() {
            if self.repo.get_by_isbn(isbn)?.is_some() {
                return Err(BookServiceError::Conflict {
                    isbn: isbn.to_string(),
                });
            }
        }

        Ok(self.repo.create(&draft)?)
    }

    /// Fetches one book by id.
    pub fn get_book(&self, id: BookId) -> ServiceResult<Book> {
        self.repo
            .get_by_id(id)?
            .ok_or(BookServiceError::NotFound(id))
    }

    /// Lists every book in creation order; empty when none exist.
    pub fn list_books(&self) -> ServiceResult<Vec<Book>> {
        let books = self.repo.list_all()?;
        debug!(
            "event=book_list module=service status=ok count={}",
            books.len()
        );
        Ok(books)
    }

    /// Replaces every mutable field of an existing book.
    ///
    /// # Contract
    /// - `id` and `created_at` are preserved.
    /// - `updated_at` is refreshed and never decreases.
    ///
    /// # Errors
    /// - `NotFound` when `id` is missing, whatever the payload.
    /// - `Validation` when any field is invalid.
    /// - `Conflict` when a different book holds the normalized ISBN.
    pub fn update_book(&self, id: BookId, payload: &BookPayload) -> ServiceResult<Book> {
        let result = self.update_book_inner(id, payload);
        match &result {
            Ok(book) => info!(
                "event=book_update module=service status=ok book_id={}",
                book.id
            ),
            Err(err) => log_failure("book_update", Some(id), err),
        }
        result
    }

    fn update_book_inner(&self, id: BookId, payload: &BookPayload) -> ServiceResult<Book> {
        let mut book = self.get_book(id)?;
        let draft = validate_payload(payload)?;

        if let Some(isbn) = draft.isbn.as_deref() {
            let taken_by_other = self
                .repo
                .get_by_isbn(isbn)?
                .is_some_and(|holder| holder.id != id);
            if taken_by_other {
                return Err(BookServiceError::Conflict {
                    isbn: isbn.to_string(),
                });
            }
        }

        book.replace_with(draft, now_utc());
        Ok(self.repo.update(&book)?)
    }

    /// Hard-deletes an existing book.
    ///
    /// # Errors
    /// - `NotFound` when `id` is missing.
    pub fn delete_book(&self, id: BookId) -> ServiceResult<()> {
        let result = self.delete_book_inner(id);
        match &result {
            Ok(()) => info!("event=book_delete module=service status=ok book_id={id}"),
            Err(err) => log_failure("book_delete", Some(id), err),
        }
        result
    }

    fn delete_book_inner(&self, id: BookId) -> ServiceResult<()> {
        self.get_book(id)?;
        // Row may vanish between the lookup and the delete.
        if !self.repo.delete(id)? {
            return Err(BookServiceError::NotFound(id));
        }
        Ok(())
    }
}

fn log_failure(event: &str, id: Option<BookId>, err: &BookServiceError) {
    let book_id = id.map_or_else(|| "-".to_string(), |id| id.to_string());
    match err {
        BookServiceError::Storage(inner) => error!(
            "event={event} module=service status=error book_id={book_id} error_code={} error={inner}",
            err.error_code()
        ),
        BookServiceError::Validation(inner) => info!(
            "event={event} module=service status=rejected book_id={book_id} error_code={} fields={:?}",
            err.error_code(),
            inner.fields()
        ),
        _ => info!(
            "event={event} module=service status=rejected book_id={book_id} error_code={}",
            err.error_code()
        ),
    }
}
