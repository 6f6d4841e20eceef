//! Core storage engine traits.
//!
//! This module defines the fundamental traits for storage backends:
//!
//! - [`StorageEngine`] - The main entry point for storage operations
//! - [`Transaction`] - ACID transaction support with bucket-addressed
//!   read/write operations
//! - [`Cursor`] - Ordered iteration over a bucket's immediate children
//!
//! All operations address entries through a [`BucketPath`]; buckets are
//! created implicitly when the first entry below them is written and cease to
//! exist when their last entry is removed.

use std::sync::Arc;

use super::{BucketPath, StorageError};

/// A child of a bucket: its key, and its value for a plain entry or `None`
/// when the child is itself a nested bucket.
pub type BucketEntry = (Vec<u8>, Option<Vec<u8>>);

/// Result type for cursor operations.
pub type CursorResult = Result<Option<BucketEntry>, StorageError>;

/// A storage engine that provides transactional bucket operations.
///
/// Engines guarantee single-writer / multiple-reader semantics: write
/// transactions are serialized, read transactions see a consistent snapshot.
/// Implementations must be thread-safe (`Send + Sync`).
pub trait StorageEngine: Send + Sync {
    /// The transaction type for this engine.
    type Transaction<'a>: Transaction
    where
        Self: 'a;

    /// Begin a read-only transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Transaction`] if the transaction cannot be started.
    fn begin_read(&self) -> Result<Self::Transaction<'_>, StorageError>;

    /// Begin a read-write transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Transaction`] if the transaction cannot be started.
    fn begin_write(&self) -> Result<Self::Transaction<'_>, StorageError>;
}

/// A transaction over the bucket tree.
///
/// Writes are atomic on [`commit`](Transaction::commit); dropping a write
/// transaction without committing rolls its changes back.
pub trait Transaction {
    /// The cursor type for iteration.
    type Cursor<'a>: Cursor
    where
        Self: 'a;

    /// Get the value stored under `key` in `bucket`.
    ///
    /// Returns `Ok(None)` when the key or any bucket on the path is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails.
    fn get(&self, bucket: &BucketPath, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store `value` under `key` in `bucket`, replacing any existing value.
    ///
    /// Buckets on the path are created as needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ReadOnly`] on a read-only transaction.
    fn put(&mut self, bucket: &BucketPath, key: &[u8], value: &[u8]) -> Result<(), StorageError>;

    /// Remove `key` from `bucket`.
    ///
    /// Returns `Ok(true)` if the key existed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ReadOnly`] on a read-only transaction.
    fn delete(&mut self, bucket: &BucketPath, key: &[u8]) -> Result<bool, StorageError>;

    /// Remove `bucket` and everything below it.
    ///
    /// Removing an absent bucket is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ReadOnly`] on a read-only transaction.
    fn delete_bucket(&mut self, bucket: &BucketPath) -> Result<(), StorageError>;

    /// Returns `true` when `bucket` holds no entries and no nested buckets.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails.
    fn bucket_is_empty(&self, bucket: &BucketPath) -> Result<bool, StorageError>;

    /// Create a cursor over the immediate children of `bucket`.
    ///
    /// The cursor starts unpositioned; position it with [`Cursor::seek`] or
    /// [`Cursor::seek_first`], or let the first [`Cursor::next`] start from
    /// the beginning.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails.
    fn cursor(&self, bucket: &BucketPath) -> Result<Self::Cursor<'_>, StorageError>;

    /// Commit the transaction, making all changes durable.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Transaction`] if the commit fails.
    fn commit(self) -> Result<(), StorageError>;

    /// Roll the transaction back, discarding all changes.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Transaction`] if the rollback fails.
    fn rollback(self) -> Result<(), StorageError>;

    /// Check if this is a read-only transaction.
    fn is_read_only(&self) -> bool;
}

/// A cursor for ordered iteration over a bucket's immediate children.
///
/// Children are yielded in byte-lexicographic key order. A child that is a
/// nested bucket is yielded once, with a `None` value; the cursor does not
/// descend into it.
///
/// # Iteration Pattern
///
/// ```ignore
/// let mut cursor = tx.cursor(&bucket)?;
/// let mut entry = cursor.seek(b"prefix")?;
/// while let Some((key, value)) = entry {
///     // process child
///     entry = cursor.next()?;
/// }
/// ```
pub trait Cursor {
    /// Position at the first child whose key is `>=` the given key and
    /// return it, or `None` when no such child exists.
    fn seek(&mut self, key: &[u8]) -> CursorResult;

    /// Position at the first child and return it, or `None` for an empty
    /// bucket.
    fn seek_first(&mut self) -> CursorResult;

    /// Advance to the next child and return it, or `None` at the end.
    ///
    /// On an unpositioned cursor this starts from the first child.
    fn next(&mut self) -> CursorResult;
}

// ============================================================================
// Blanket Implementations
// ============================================================================

/// Implement `StorageEngine` for `Arc<E>` to allow shared ownership of
/// engines, e.g. collection handles sharing one store.
impl<E: StorageEngine> StorageEngine for Arc<E> {
    type Transaction<'a>
        = E::Transaction<'a>
    where
        Self: 'a;

    fn begin_read(&self) -> Result<Self::Transaction<'_>, StorageError> {
        (**self).begin_read()
    }

    fn begin_write(&self) -> Result<Self::Transaction<'_>, StorageError> {
        (**self).begin_write()
    }
}
