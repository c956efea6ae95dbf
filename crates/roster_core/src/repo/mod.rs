//! Record store: repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - CRUD and bulk updates for members and teams.
//! - Predicate, page, and slice queries compiled to SQL.
//! - Keep SQL details out of service callers.
//!
//! # Invariants
//! - Point and set lookups return empty results for missing rows.
//! - Structural misuse surfaces as `RepoError::InvalidArgument`.
//! - Storage failures pass through unchanged as `RepoError::Db`.

use crate::db::migrations::{latest_version, schema_version, REQUIRED_TABLES};
use crate::db::DbError;
use crate::query::QueryError;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod context;
pub mod member_repo;
pub mod team_repo;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Rejected argument; never retried.
    InvalidArgument(QueryError),
    /// An update targeted an identity that no longer exists.
    NotFound { entity: &'static str, id: i64 },
    /// The operation needs a saved entity but got one without identity.
    UnsavedEntity(&'static str),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    /// A stored row could not be mapped back to the model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidArgument(err) => write!(f, "invalid argument: {err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::UnsavedEntity(entity) => write!(f, "{entity} has not been saved yet"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid stored data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidArgument(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<QueryError> for RepoError {
    fn from(value: QueryError) -> Self {
        Self::InvalidArgument(value)
    }
}

/// Refuses connections that were not opened through `db::open_*`.
pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &table in REQUIRED_TABLES {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [table],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

/// Narrows a stored integer to a model field, reporting the column on overflow.
pub(crate) fn narrow_i32(value: i64, column: &str) -> RepoResult<i32> {
    i32::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("value {value} out of range in {column}")))
}
