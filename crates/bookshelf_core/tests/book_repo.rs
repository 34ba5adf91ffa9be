use bookshelf_core::db::{open_db, open_db_in_memory};
use bookshelf_core::{
    BookRepository, InMemoryBookRepository, NewBook, RepoError, SqliteBookRepository,
};
use chrono::Duration;
use std::collections::HashSet;

fn draft(title: &str, isbn: Option<&str>) -> NewBook {
    NewBook {
        title: title.to_string(),
        author: "J.R.R. Tolkien".to_string(),
        publication_year: 1937,
        genre: "Fantasy".to_string(),
        isbn: isbn.map(str::to_string),
        description: None,
    }
}

// Contract checks shared by every repository implementation.

fn create_assigns_id_and_timestamps(repo: &impl BookRepository) {
    let book = repo
        .create(&draft("The Hobbit", Some("9780547928227")))
        .unwrap();

    assert!(book.id > 0);
    assert_eq!(book.title, "The Hobbit");
    assert_eq!(book.isbn.as_deref(), Some("9780547928227"));
    assert_eq!(book.created_at, book.updated_at);

    let loaded = repo.get_by_id(book.id).unwrap().unwrap();
    assert_eq!(loaded, book);
}

fn lookups_return_none_when_absent(repo: &impl BookRepository) {
    assert!(repo.get_by_id(404).unwrap().is_none());
    assert!(repo.get_by_isbn("0000000000").unwrap().is_none());
}

fn get_by_isbn_finds_holder(repo: &impl BookRepository) {
    repo.create(&draft("No isbn", None)).unwrap();
    let held = repo
        .create(&draft("The Hobbit", Some("9780547928227")))
        .unwrap();

    let found = repo.get_by_isbn("9780547928227").unwrap().unwrap();
    assert_eq!(found.id, held.id);
}

fn list_all_is_in_creation_order(repo: &impl BookRepository) {
    assert!(repo.list_all().unwrap().is_empty());

    let first = repo.create(&draft("first", None)).unwrap();
    let second = repo.create(&draft("second", None)).unwrap();
    let third = repo.create(&draft("third", None)).unwrap();

    let ids: Vec<_> = repo.list_all().unwrap().iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![first.id, second.id, third.id]);
}

fn update_replaces_fields_but_not_created_at(repo: &impl BookRepository) {
    let original = repo.create(&draft("draft", Some("0451524935"))).unwrap();

    let mut changed = original.clone();
    changed.title = "final".to_string();
    changed.isbn = None;
    changed.description = Some("revised".to_string());
    changed.updated_at = original.updated_at + Duration::seconds(30);
    changed.created_at = original.created_at - Duration::days(1);

    let stored = repo.update(&changed).unwrap();
    assert_eq!(stored.title, "final");
    assert_eq!(stored.isbn, None);
    assert_eq!(stored.description.as_deref(), Some("revised"));
    assert_eq!(stored.created_at, original.created_at);
    assert_eq!(stored.updated_at, original.updated_at + Duration::seconds(30));
    assert_eq!(repo.get_by_id(original.id).unwrap().unwrap(), stored);
}

fn update_missing_returns_not_found(repo: &impl BookRepository) {
    let mut ghost = repo.create(&draft("ghost", None)).unwrap();
    assert!(repo.delete(ghost.id).unwrap());

    ghost.title = "still gone".to_string();
    let err = repo.update(&ghost).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == ghost.id));
}

fn delete_reports_whether_row_existed(repo: &impl BookRepository) {
    let book = repo.create(&draft("short lived", None)).unwrap();

    assert!(repo.delete(book.id).unwrap());
    assert!(!repo.delete(book.id).unwrap());
    assert!(repo.get_by_id(book.id).unwrap().is_none());
}

fn ids_are_never_reused(repo: &impl BookRepository) {
    let mut seen = HashSet::new();
    for round in 0..3 {
        let book = repo.create(&draft(&format!("round {round}"), None)).unwrap();
        assert!(seen.insert(book.id), "id {} was reused", book.id);
        repo.delete(book.id).unwrap();
    }
}

fn storage_rejects_duplicate_isbn(repo: &impl BookRepository) {
    let first = repo.create(&draft("first", Some("9780061120084"))).unwrap();
    let second = repo.create(&draft("second", None)).unwrap();

    let err = repo
        .create(&draft("copy", Some("9780061120084")))
        .unwrap_err();
    assert!(matches!(err, RepoError::DuplicateIsbn(isbn) if isbn == "9780061120084"));

    let mut stolen = second.clone();
    stolen.isbn = first.isbn.clone();
    let err = repo.update(&stolen).unwrap_err();
    assert!(matches!(err, RepoError::DuplicateIsbn(_)));

    // Re-saving a book with its own ISBN is not a conflict.
    repo.update(&first).unwrap();
    assert_eq!(repo.list_all().unwrap().len(), 2);
}

macro_rules! repository_contract {
    ($module:ident, $make:expr) => {
        mod $module {
            use super::*;

            #[test]
            fn create_assigns_id_and_timestamps() {
                super::create_assigns_id_and_timestamps(&$make);
            }

            #[test]
            fn lookups_return_none_when_absent() {
                super::lookups_return_none_when_absent(&$make);
            }

            #[test]
            fn get_by_isbn_finds_holder() {
                super::get_by_isbn_finds_holder(&$make);
            }

            #[test]
            fn list_all_is_in_creation_order() {
                super::list_all_is_in_creation_order(&$make);
            }

            #[test]
            fn update_replaces_fields_but_not_created_at() {
                super::update_replaces_fields_but_not_created_at(&$make);
            }

            #[test]
            fn update_missing_returns_not_found() {
                super::update_missing_returns_not_found(&$make);
            }

            #[test]
            fn delete_reports_whether_row_existed() {
                super::delete_reports_whether_row_existed(&$make);
            }

            #[test]
            fn ids_are_never_reused() {
                super::ids_are_never_reused(&$make);
            }

            #[test]
            fn storage_rejects_duplicate_isbn() {
                super::storage_rejects_duplicate_isbn(&$make);
            }
        }
    };
}

repository_contract!(in_memory, InMemoryBookRepository::new());
repository_contract!(
    sqlite,
    SqliteBookRepository::new(&open_db_in_memory().unwrap())
);

#[test]
fn sqlite_books_survive_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("books.db");

    let created = {
        let conn = open_db(&path).unwrap();
        let repo = SqliteBookRepository::new(&conn);
        repo.create(&draft("The Hobbit", Some("9780547928227")))
            .unwrap()
    };

    let conn = open_db(&path).unwrap();
    let repo = SqliteBookRepository::new(&conn);
    assert_eq!(repo.get_by_id(created.id).unwrap().unwrap(), created);
}

#[test]
fn sqlite_check_constraints_reject_invalid_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::new(&conn);

    let err = repo.create(&draft("", None)).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert!(repo.list_all().unwrap().is_empty());
}
