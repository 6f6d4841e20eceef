//! Error types for core operations.

use thiserror::Error;

/// Errors produced by core type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A value could not be parsed as a scalar.
    ///
    /// Only booleans, strings, and numbers are indexable; objects, arrays,
    /// and nulls are rejected.
    #[error("invalid value")]
    InvalidValue,
}
