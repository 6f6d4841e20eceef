//! Error types for the document index engine.

use termdb_core::CoreError;
use termdb_storage::StorageError;
use thiserror::Error;

/// Errors surfaced by stores, collections, and queries.
///
/// Missing data is never an error: extraction at an absent path yields no
/// values, `get` of an unknown reference yields `None`, and queries over
/// empty collections yield empty results.
#[derive(Debug, Error)]
pub enum Error {
    /// A document could not be parsed as JSON.
    #[error("invalid json")]
    InvalidJson,

    /// A value could not be parsed as an indexable scalar.
    #[error("invalid value")]
    InvalidValue,

    /// An empty query was given.
    #[error("no query given")]
    NoQuery,

    /// No index covers the query.
    #[error("no index found")]
    NoIndex,

    /// The caller's cancellation handle was cancelled.
    #[error("operation cancelled")]
    Cancelled,

    /// The caller's deadline passed.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// JSON-LD expansion failed.
    #[error("expansion failed: {0}")]
    Expand(String),

    /// The underlying store failed; propagated unwrapped.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A caller-supplied walker aborted iteration.
    #[error("{0}")]
    Walker(String),
}

impl From<CoreError> for Error {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::InvalidValue => Self::InvalidValue,
        }
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
