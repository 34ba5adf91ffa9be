//! CLI argument definitions.
//!
//! Every global option has an environment fallback so the binary can be
//! configured without flags.

use bookshelf_core::{BookId, BookPayload};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Manage a bookshelf stored in SQLite.
#[derive(Parser, Debug)]
#[command(name = "bookshelf")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// SQLite database file; an empty in-memory store is used when omitted
    #[arg(long, env = "BOOKSHELF_DB", global = true)]
    pub db: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error
    #[arg(long, env = "BOOKSHELF_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Absolute directory for rotating log files; logs go to stderr when omitted
    #[arg(long, env = "BOOKSHELF_LOG_DIR", global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Liveness check
    Ping,
    /// List every book
    List,
    /// Show one book
    Get { id: BookId },
    /// Add a new book
    Add(BookFields),
    /// Replace every field of an existing book
    Update {
        id: BookId,
        #[command(flatten)]
        fields: BookFields,
    },
    /// Delete a book
    Delete { id: BookId },
}

impl Command {
    /// Subcommand name, safe to log.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::List => "list",
            Self::Get { .. } => "get",
            Self::Add(_) => "add",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct BookFields {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub author: String,
    #[arg(long = "year", allow_negative_numbers = true)]
    pub publication_year: i32,
    #[arg(long)]
    pub genre: String,
    /// ISBN-10 or ISBN-13; hyphens and spaces are ignored
    #[arg(long)]
    pub isbn: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

impl From<BookFields> for BookPayload {
    fn from(fields: BookFields) -> Self {
        Self {
            title: fields.title,
            author: fields.author,
            publication_year: fields.publication_year,
            genre: fields.genre,
            isbn: fields.isbn,
            description: fields.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::{CommandFactory, Parser};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn update_parses_id_and_fields() {
        let cli = Cli::try_parse_from([
            "bookshelf",
            "--db",
            "/tmp/books.db",
            "update",
            "3",
            "--title",
            "1984",
            "--author",
            "George Orwell",
            "--year",
            "1949",
            "--genre",
            "Dystopian Fiction",
            "--isbn",
            "978-0-451-52493-5",
        ])
        .unwrap();

        match cli.command {
            Command::Update { id, fields } => {
                assert_eq!(id, 3);
                assert_eq!(fields.publication_year, 1949);
                assert_eq!(fields.isbn.as_deref(), Some("978-0-451-52493-5"));
                assert_eq!(fields.description, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.db.unwrap().to_str(), Some("/tmp/books.db"));
    }
}
