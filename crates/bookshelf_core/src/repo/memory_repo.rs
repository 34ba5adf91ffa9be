//! In-memory book repository.
//!
//! # Responsibility
//! - Provide a storage-free `BookRepository` for tests and ephemeral runs.
//!
//! # Invariants
//! - Ids come from a monotonic counter and are never reused.
//! - All reads and writes go through one mutex, so the ISBN check and the
//!   write it guards happen atomically.

use crate::model::book::{now_utc, Book, BookId, NewBook};
use crate::repo::book_repo::{BookRepository, RepoError, RepoResult};
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// Map-backed repository, ordered by id.
#[derive(Debug)]
pub struct InMemoryBookRepository {
    state: Mutex<MemoryState>,
}

#[derive(Debug)]
struct MemoryState {
    next_id: BookId,
    books: BTreeMap<BookId, Book>,
}

impl MemoryState {
    fn isbn_holder(&self, isbn: &str) -> Option<&Book> {
        self.books
            .values()
            .find(|book| book.isbn.as_deref() == Some(isbn))
    }
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                next_id: 1,
                books: BTreeMap::new(),
            }),
        }
    }

    /// Number of stored books.
    pub fn len(&self) -> usize {
        self.state.lock().books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryBookRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl BookRepository for InMemoryBookRepository {
    fn create(&self, draft: &NewBook) -> RepoResult<Book> {
        let mut state = self.state.lock();

        if let Some(isbn) = draft.isbn.as_deref() {
            if state.isbn_holder(isbn).is_some() {
                return Err(RepoError::DuplicateIsbn(isbn.to_string()));
            }
        }

        let id = state.next_id;
        state.next_id += 1;
        let book = Book::from_draft(id, draft.clone(), now_utc());
        state.books.insert(id, book.clone());
        Ok(book)
    }

    fn get_by_id(&self, id: BookId) -> RepoResult<Option<Book>> {
        Ok(self.state.lock().books.get(&id).cloned())
    }

    fn get_by_isbn(&self, isbn: &str) -> RepoResult<Option<Book>> {
        Ok(self.state.lock().isbn_holder(isbn).cloned())
    }

    fn list_all(&self) -> RepoResult<Vec<Book>> {
        Ok(self.state.lock().books.values().cloned().collect())
    }

    fn update(&self, book: &Book) -> RepoResult<Book> {
        let mut state = self.state.lock();

        if let Some(isbn) = book.isbn.as_deref() {
            if state
                .isbn_holder(isbn)
                .is_some_and(|holder| holder.id != book.id)
            {
                return Err(RepoError::DuplicateIsbn(isbn.to_string()));
            }
        }

        let stored = state
            .books
            .get_mut(&book.id)
            .ok_or(RepoError::NotFound(book.id))?;
        *stored = Book {
            created_at: stored.created_at,
            ..book.clone()
        };
        Ok(stored.clone())
    }

    fn delete(&self, id: BookId) -> RepoResult<bool> {
        Ok(self.state.lock().books.remove(&id).is_some())
    }
}
