//! SQLite storage engine bootstrap.
//!
//! # Responsibility
//! - Open file-backed or in-memory SQLite connections for the record store.
//! - Bring the `team`/`member` schema up to the version this binary expects.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - Repositories refuse connections that have not been migrated.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Storage-engine failure surfaced unchanged to callers.
#[derive(Debug)]
pub enum DbError {
    /// Any error raised by SQLite itself.
    Sqlite(rusqlite::Error),
    /// The database was written by a newer binary.
    UnsupportedSchemaVersion { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite error: {err}"),
            Self::UnsupportedSchemaVersion { found, supported } => write!(
                f,
                "schema version {found} is newer than the supported version {supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
