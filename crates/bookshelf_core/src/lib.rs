//! Core domain logic for the bookshelf service.
//! This crate is the single source of truth for book invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogTarget, LoggingError};
pub use model::book::{Book, BookId, BookPayload, NewBook};
pub use model::validation::{
    normalize_isbn, validate_payload, BookField, FieldViolation, ValidationError, ViolationReason,
};
pub use repo::book_repo::{BookRepository, RepoError, RepoResult, SqliteBookRepository};
pub use repo::memory_repo::InMemoryBookRepository;
pub use service::book_service::{
    BookService, BookServiceError, ErrorResponse, FieldErrorDetail, ServiceResult,
};

/// Liveness check, answered by `GET /`.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
