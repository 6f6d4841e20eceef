//! Redb storage backend.
//!
//! This module implements the storage engine traits over Redb, a pure-Rust
//! embedded database with ACID transactions.
//!
//! Redb exposes flat tables of byte keys, so the nested bucket tree is
//! emulated inside a single physical table: every bucket path segment is
//! written into the physical key through an order-preserving encoding, which
//! makes each bucket's subtree a contiguous physical key range. See
//! [`paths`] for the encoding.
//!
//! # Example
//!
//! ```ignore
//! use termdb_storage::backends::redb::{RedbConfig, RedbEngine};
//! use termdb_storage::{BucketPath, StorageEngine, Transaction};
//!
//! let engine = RedbEngine::open_with_config(
//!     "index.db",
//!     RedbConfig::new().sync_writes(false),
//! )?;
//!
//! let bucket = BucketPath::new(["people", "_documents"]);
//! let mut tx = engine.begin_write()?;
//! tx.put(&bucket, b"ref", b"{}")?;
//! tx.commit()?;
//! ```
//!
//! For tests, [`RedbEngine::in_memory`] creates a database that is dropped
//! with the engine.

mod engine;
pub mod paths;
mod transaction;

pub use engine::{RedbConfig, RedbEngine};
pub use transaction::{RedbCursor, RedbTransaction};
