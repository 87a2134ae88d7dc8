use bandobast_core::DatabaseError;
use thiserror::Error;

/// Crate-internal failure type. Converted into
/// [`bandobast_core::Error`] at the repository boundary, usually via
/// `map_err(StorageError::from)` followed by `?`.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Query failed: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("{0}")]
    Internal(String),
}

impl From<StorageError> for bandobast_core::Error {
    fn from(value: StorageError) -> Self {
        let database = match value {
            StorageError::Pool(err) => DatabaseError::Pool(err.to_string()),
            StorageError::Query(err) => DatabaseError::QueryFailed(err.to_string()),
            StorageError::Migration(message) => DatabaseError::Migration(message),
            StorageError::Internal(message) => DatabaseError::Internal(message),
        };
        bandobast_core::Error::Database(database)
    }
}

/// Shorthand for the "row decodes to an impossible value" case, e.g.
/// an unknown status string written by a future version.
pub(crate) fn corrupt_row(message: impl Into<String>) -> bandobast_core::Error {
    bandobast_core::Error::Database(DatabaseError::Internal(message.into()))
}
