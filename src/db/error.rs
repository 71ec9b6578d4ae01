//! Database error types.

use derive_more::{Display, Error};
use diesel::result::DatabaseErrorKind;
use tracing::instrument;

/// What went wrong in the store.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum DbErrorKind {
    /// Could not open or configure a connection.
    #[display("Connection error: {}", _0)]
    Connection(String),
    /// Schema migration failed.
    #[display("Migration error: {}", _0)]
    Migration(String),
    /// A UNIQUE constraint rejected the write.
    #[display("Unique violation: {}", _0)]
    UniqueViolation(String),
    /// A FOREIGN KEY constraint rejected the write.
    #[display("Foreign key violation: {}", _0)]
    ForeignKeyViolation(String),
    /// A compare-and-swap update found the row changed underneath it.
    #[display("Concurrent write conflict: {}", _0)]
    Conflict(String),
    /// Any other query failure.
    #[display("Query error: {}", _0)]
    Query(String),
}

/// Database error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Database error: {} at {}:{}", kind, file, line)]
pub struct DbError {
    /// Error category and message.
    #[error(not(source))]
    pub kind: DbErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DbError {
    /// Creates a new database error with caller location tracking.
    #[track_caller]
    #[instrument]
    pub fn new(kind: DbErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Creates a compare-and-swap conflict error.
    #[track_caller]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(DbErrorKind::Conflict(message.into()))
    }

    /// Returns the error category.
    pub fn kind(&self) -> &DbErrorKind {
        &self.kind
    }

    /// Checks if a UNIQUE constraint rejected the write.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self.kind, DbErrorKind::UniqueViolation(_))
    }

    /// Checks if a FOREIGN KEY constraint rejected the write.
    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self.kind, DbErrorKind::ForeignKeyViolation(_))
    }

    /// Checks if a concurrent write won the race.
    pub fn is_conflict(&self) -> bool {
        matches!(self.kind, DbErrorKind::Conflict(_))
    }
}

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        let kind = match &err {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                DbErrorKind::UniqueViolation(info.message().to_string())
            }
            diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                DbErrorKind::ForeignKeyViolation(info.message().to_string())
            }
            other => DbErrorKind::Query(other.to_string()),
        };
        Self::new(kind)
    }
}

impl From<diesel::ConnectionError> for DbError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::new(DbErrorKind::Connection(err.to_string()))
    }
}
