//! Repository layer: storage contract and implementations.
//!
//! # Responsibility
//! - Define the `BookRepository` contract used by the service layer.
//! - Isolate SQLite details from business orchestration.
//!
//! # Invariants
//! - Repositories never validate payloads; that is the service's job.
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateIsbn`)
//!   alongside storage transport errors.

pub mod book_repo;
pub mod memory_repo;
