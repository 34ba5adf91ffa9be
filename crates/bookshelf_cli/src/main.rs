//! Command-line entry point for the bookshelf core.
//!
//! # Responsibility
//! - Translate CLI arguments into `BookService` calls.
//! - Print results as JSON on stdout and errors as JSON on stderr.
//!
//! # Invariants
//! - Domain failures never panic; each maps to a distinct exit code.

mod args;

use args::{Cli, Command};
use bookshelf_core::db::{open_db, open_db_in_memory, DbError};
use bookshelf_core::{
    core_version, default_log_level, init_logging, ping, BookService, BookServiceError,
    ErrorResponse, LogTarget, LoggingError, SqliteBookRepository,
};
use clap::Parser;
use log::debug;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::process::ExitCode;

#[derive(Debug)]
enum CliError {
    Logging(LoggingError),
    Db(DbError),
    Service(BookServiceError),
    Output(serde_json::Error),
}

impl CliError {
    fn exit_code(&self) -> u8 {
        match self {
            Self::Service(err) => match err.status_code() {
                404 => 3,
                409 => 4,
                422 => 5,
                _ => 1,
            },
            _ => 1,
        }
    }

    fn to_response(&self) -> ErrorResponse {
        match self {
            Self::Service(err) => err.to_response(),
            other => ErrorResponse {
                detail: other.to_string(),
                errors: Vec::new(),
            },
        }
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Service(err) => write!(f, "{err}"),
            Self::Output(err) => write!(f, "failed to encode output: {err}"),
        }
    }
}

impl From<BookServiceError> for CliError {
    fn from(value: BookServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Output(value)
    }
}

#[derive(Serialize)]
struct Liveness {
    message: &'static str,
    status: &'static str,
    version: &'static str,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match serde_json::to_string_pretty(&err.to_response()) {
                Ok(body) => eprintln!("{body}"),
                Err(_) => eprintln!("{err}"),
            }
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let level = cli
        .log_level
        .unwrap_or_else(|| default_log_level().to_string());
    let target = cli.log_dir.map_or(LogTarget::Stderr, LogTarget::Directory);
    init_logging(&level, target).map_err(CliError::Logging)?;

    if let Command::Ping = cli.command {
        return print_json(&Liveness {
            message: ping(),
            status: "running",
            version: core_version(),
        });
    }

    let conn = match &cli.db {
        Some(path) => open_db(path),
        None => open_db_in_memory(),
    }
    .map_err(CliError::Db)?;
    let service = BookService::new(SqliteBookRepository::new(&conn));

    debug!(
        "event=cli_command module=cli status=start command={}",
        cli.command.name()
    );
    match cli.command {
        Command::Ping => Ok(()),
        Command::List => print_json(&service.list_books()?),
        Command::Get { id } => print_json(&service.get_book(id)?),
        Command::Add(fields) => print_json(&service.create_book(&fields.into())?),
        Command::Update { id, fields } => print_json(&service.update_book(id, &fields.into())?),
        Command::Delete { id } => {
            service.delete_book(id)?;
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
