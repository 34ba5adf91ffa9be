//! Book domain model.
//!
//! # Responsibility
//! - Define the canonical `Book` record and its inbound payload shape.
//! - Own the field constraints and ISBN normalization rules.
//!
//! # Invariants
//! - Every `Book` is identified by a repository-assigned `BookId`.
//! - Deletion is a hard removal; ids are never reused.

pub mod book;
pub mod validation;
