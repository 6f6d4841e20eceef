//! `termdb` Storage
//!
//! Storage engine abstraction for termdb. The document index engine is
//! written against the traits in [`engine`]; concrete backends live under
//! [`backends`].
//!
//! The store model is a transactional, byte-ordered key/value space with
//! **nestable buckets**: every entry lives in a bucket addressed by a
//! [`BucketPath`] (an ordered list of byte-string segments), buckets can
//! contain both entries and further buckets, and cursors iterate a bucket's
//! immediate children in byte-lexicographic key order.
//!
//! # Example
//!
//! ```
//! use termdb_storage::backends::redb::RedbEngine;
//! use termdb_storage::{BucketPath, StorageEngine, Transaction};
//!
//! # fn main() -> Result<(), termdb_storage::StorageError> {
//! let engine = RedbEngine::in_memory()?;
//! let bucket = BucketPath::new(["people", "_documents"]);
//!
//! let mut tx = engine.begin_write()?;
//! tx.put(&bucket, b"ref-1", b"{}")?;
//! tx.commit()?;
//!
//! let tx = engine.begin_read()?;
//! assert_eq!(tx.get(&bucket, b"ref-1")?, Some(b"{}".to_vec()));
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used)]

pub mod backends;
pub mod engine;

pub use engine::{
    BucketEntry, BucketPath, Cursor, CursorResult, StorageEngine, StorageError, StorageResult,
    Transaction,
};
