//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation and repository calls into use-case APIs.
//! - Keep callers (CLI, HTTP router) decoupled from storage details.

pub mod book_service;
