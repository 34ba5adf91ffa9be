//! Book domain record.
//!
//! # Responsibility
//! - Define the persisted `Book` shape and the inbound `BookPayload`.
//! - Provide the validated, normalized `NewBook` draft handed to storage.
//!
//! # Invariants
//! - `id` and `created_at` never change after creation.
//! - `updated_at >= created_at` for every persisted book.
//! - Timestamps are UTC with microsecond precision so they survive a
//!   round-trip through text storage unchanged.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Repository-assigned book identifier.
pub type BookId = i64;

/// Persisted book record, as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub publication_year: i32,
    pub genre: String,
    /// Normalized digit-only ISBN-10 or ISBN-13.
    pub isbn: Option<String>,
    pub description: Option<String>,
    /// Serialized as RFC 3339.
    pub created_at: DateTime<Utc>,
    /// Serialized as RFC 3339. Refreshed on every update.
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Builds a persisted record from a validated draft.
    ///
    /// Used by repositories once they have assigned an id.
    pub fn from_draft(id: BookId, draft: NewBook, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            author: draft.author,
            publication_year: draft.publication_year,
            genre: draft.genre,
            isbn: draft.isbn,
            description: draft.description,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces every mutable field with `draft` and refreshes `updated_at`.
    ///
    /// # Invariants
    /// - `id` and `created_at` are left untouched.
    /// - `updated_at` never moves backwards, even if the clock does.
    pub fn replace_with(&mut self, draft: NewBook, now: DateTime<Utc>) {
        self.title = draft.title;
        self.author = draft.author;
        self.publication_year = draft.publication_year;
        self.genre = draft.genre;
        self.isbn = draft.isbn;
        self.description = draft.description;
        self.updated_at = now.max(self.updated_at);
    }
}

/// Create/update request body.
///
/// Field values are raw caller input; nothing here is trusted until it
/// passes [`crate::model::validation::validate_payload`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookPayload {
    pub title: String,
    pub author: String,
    pub publication_year: i32,
    pub genre: String,
    /// Hyphens and whitespace are accepted on input.
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Validated book fields without identity or timestamps.
///
/// Produced by [`crate::model::validation::validate_payload`]. Repositories
/// store it as given and do not re-check any field constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub publication_year: i32,
    pub genre: String,
    pub isbn: Option<String>,
    pub description: Option<String>,
}

/// Current UTC time truncated to microseconds.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
