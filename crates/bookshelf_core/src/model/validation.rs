//! Book payload validation and ISBN normalization.
//!
//! # Responsibility
//! - Normalize raw ISBN input into its canonical digit-only form.
//! - Check every field constraint of an inbound payload.
//!
//! # Invariants
//! - Pure functions; no I/O and no logging.
//! - Violations are collected in a fixed field order: title, author, genre,
//!   publication_year, description, isbn.
//! - Lengths are counted in Unicode scalar values, not bytes.
//! - Text fields never contain NUL; SQLite `length()` stops at the first one,
//!   so such values would slip past the schema's length checks.

use crate::model::book::{BookPayload, NewBook};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const TITLE_MAX_CHARS: usize = 200;
pub const AUTHOR_MAX_CHARS: usize = 100;
pub const GENRE_MAX_CHARS: usize = 50;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;
pub const PUBLICATION_YEAR_MIN: i32 = 1000;
pub const PUBLICATION_YEAR_MAX: i32 = 2100;
pub const ISBN_LENGTHS: [usize; 2] = [10, 13];

static ISBN_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s-]+").expect("valid isbn separator regex"));

/// Book field named by a validation or conflict error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BookField {
    Title,
    Author,
    PublicationYear,
    Genre,
    Isbn,
    Description,
}

impl BookField {
    /// Wire name of the field, as used in request/response bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::PublicationYear => "publication_year",
            Self::Genre => "genre",
            Self::Isbn => "isbn",
            Self::Description => "description",
        }
    }
}

impl Display for BookField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a single field was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationReason {
    /// Required text field is empty.
    Empty,
    /// Text field exceeds its maximum length.
    TooLong { max: usize, actual: usize },
    /// Text field contains a NUL character.
    ContainsNul,
    /// Integer field falls outside its inclusive range.
    OutOfRange { min: i32, max: i32, actual: i32 },
    /// Normalized ISBN contains something other than ASCII digits.
    NonDigitIsbn,
    /// Normalized ISBN is neither 10 nor 13 digits long.
    IsbnLength { actual: usize },
}

impl Display for ViolationReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "must not be empty"),
            Self::TooLong { max, actual } => {
                write!(f, "must be at most {max} characters, got {actual}")
            }
            Self::ContainsNul => write!(f, "must not contain NUL characters"),
            Self::OutOfRange { min, max, actual } => {
                write!(f, "must be between {min} and {max}, got {actual}")
            }
            Self::NonDigitIsbn => write!(
                f,
                "must contain only digits (hyphens and spaces are ignored)"
            ),
            Self::IsbnLength { actual } => {
                write!(f, "must be exactly 10 or 13 digits, got {actual}")
            }
        }
    }
}

/// One rejected field and the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: BookField,
    pub reason: ViolationReason,
}

impl Display for FieldViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Payload rejected by validation.
///
/// Always carries at least one violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    violations: Vec<FieldViolation>,
}

impl ValidationError {
    /// Every violation, in validation order.
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Rejected fields, in validation order.
    pub fn fields(&self) -> Vec<BookField> {
        self.violations.iter().map(|v| v.field).collect()
    }

    /// Whether `field` is among the rejected fields.
    pub fn has_field(&self, field: BookField) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid book payload: ")?;
        for (index, violation) in self.violations.iter().enumerate() {
            if index > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl Error for ValidationError {}

/// Strips hyphens and whitespace from a raw ISBN.
///
/// Returns `None` for missing input or when nothing is left after stripping.
/// Digit content and length are checked by [`validate_payload`], not here.
/// Idempotent: normalizing a normalized value returns it unchanged.
pub fn normalize_isbn(raw: Option<&str>) -> Option<String> {
    let stripped = ISBN_SEPARATOR_RE.replace_all(raw?, "");
    if stripped.is_empty() {
        None
    } else {
        Some(stripped.into_owned())
    }
}

/// Checks every field of `payload` and returns the normalized draft.
///
/// # Errors
/// - Returns `ValidationError` listing every violated field when any
///   constraint fails.
pub fn validate_payload(payload: &BookPayload) -> Result<NewBook, ValidationError> {
    let mut violations = Vec::new();

    check_text(
        &mut violations,
        BookField::Title,
        &payload.title,
        TITLE_MAX_CHARS,
    );
    check_text(
        &mut violations,
        BookField::Author,
        &payload.author,
        AUTHOR_MAX_CHARS,
    );
    check_text(
        &mut violations,
        BookField::Genre,
        &payload.genre,
        GENRE_MAX_CHARS,
    );

    if !(PUBLICATION_YEAR_MIN..=PUBLICATION_YEAR_MAX).contains(&payload.publication_year) {
        violations.push(FieldViolation {
            field: BookField::PublicationYear,
            reason: ViolationReason::OutOfRange {
                min: PUBLICATION_YEAR_MIN,
                max: PUBLICATION_YEAR_MAX,
                actual: payload.publication_year,
            },
        });
    }

    if let Some(description) = payload.description.as_deref() {
        if let Some(reason) = text_violation(description, DESCRIPTION_MAX_CHARS) {
            violations.push(FieldViolation {
                field: BookField::Description,
                reason,
            });
        }
    }

    let isbn = normalize_isbn(payload.isbn.as_deref());
    if let Some(value) = isbn.as_deref() {
        if let Some(reason) = isbn_violation(value) {
            violations.push(FieldViolation {
                field: BookField::Isbn,
                reason,
            });
        }
    }

    if !violations.is_empty() {
        return Err(ValidationError { violations });
    }

    Ok(NewBook {
        title: payload.title.clone(),
        author: payload.author.clone(),
        publication_year: payload.publication_year,
        genre: payload.genre.clone(),
        isbn,
        description: payload.description.clone(),
    })
}

fn check_text(violations: &mut Vec<FieldViolation>, field: BookField, value: &str, max: usize) {
    let reason = if value.is_empty() {
        Some(ViolationReason::Empty)
    } else {
        text_violation(value, max)
    };
    if let Some(reason) = reason {
        violations.push(FieldViolation { field, reason });
    }
}

fn text_violation(value: &str, max: usize) -> Option<ViolationReason> {
    let actual = value.chars().count();
    if actual > max {
        Some(ViolationReason::TooLong { max, actual })
    } else if value.contains('\0') {
        Some(ViolationReason::ContainsNul)
    } else {
        None
    }
}

fn isbn_violation(normalized: &str) -> Option<ViolationReason> {
    if !normalized.chars().all(|c| c.is_ascii_digit()) {
        return Some(ViolationReason::NonDigitIsbn);
    }
    // All ASCII at this point, so byte length equals digit count.
    let actual = normalized.len();
    if ISBN_LENGTHS.contains(&actual) {
        None
    } else {
        Some(ViolationReason::IsbnLength { actual })
    }
}

#[cfg(test)]
mod tests {
    use super::{check_text, isbn_violation, BookField, ViolationReason};

    #[test]
    fn check_text_counts_characters_not_bytes() {
        let mut violations = Vec::new();
        check_text(&mut violations, BookField::Genre, &"é".repeat(50), 50);
        assert!(violations.is_empty());

        check_text(&mut violations, BookField::Genre, &"é".repeat(51), 50);
        assert_eq!(
            violations[0].reason,
            ViolationReason::TooLong {
                max: 50,
                actual: 51
            }
        );
    }

    #[test]
    fn check_text_rejects_embedded_nul() {
        let mut violations = Vec::new();
        check_text(&mut violations, BookField::Title, "\0Dune", 200);
        check_text(&mut violations, BookField::Author, "Frank\0Herbert", 100);

        assert_eq!(violations.len(), 2);
        assert!(violations
            .iter()
            .all(|v| v.reason == ViolationReason::ContainsNul));
    }

    #[test]
    fn isbn_violation_reports_digits_before_length() {
        assert_eq!(isbn_violation("12345X"), Some(ViolationReason::NonDigitIsbn));
        assert_eq!(
            isbn_violation("12345"),
            Some(ViolationReason::IsbnLength { actual: 5 })
        );
        assert_eq!(isbn_violation("0451524935"), None);
    }
}
