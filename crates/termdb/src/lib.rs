//! `termdb` - An Embeddable JSON-LD Document Index
//!
//! termdb stores JSON-LD documents in an ordered key/value store and keeps
//! secondary indices over scalar values extracted at caller-declared term
//! paths. Queries are conjunctions of equality, range, and prefix conditions;
//! the engine answers them through the best-fitting index, falling back to a
//! full document scan when no index applies.
//!
//! # Quick Start
//!
//! ```
//! use termdb::{FieldIndexer, Query, QueryPart, Store, TermPath};
//!
//! # fn main() -> Result<(), termdb::Error> {
//! let store = Store::in_memory()?;
//! let mut people = store.collection("people");
//!
//! // Declare an index over the expanded name term
//! let name = TermPath::new(["http://schema.org/name"]);
//! let index = people.new_index("byName", vec![FieldIndexer::new(name.clone())]);
//! people.add_index([index])?;
//!
//! // Add a document (inline context, expanded by the built-in processor)
//! let doc = termdb::Document::from(
//!     r#"{"@context": {"@vocab": "http://schema.org/"}, "name": "Jane Doe"}"#,
//! );
//! people.add(&[doc])?;
//!
//! // Query through the index
//! let query = Query::new(QueryPart::eq(name, "Jane Doe"));
//! let docs = people.find(&termdb::Context::background(), &query)?;
//! assert_eq!(docs.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! # Indexing
//!
//! An index is an ordered list of [`FieldIndexer`]s. Each indexer addresses
//! one term path and may carry a transform (applied to indexed values *and*
//! query values) and a tokenizer (splitting one value into many index
//! entries):
//!
//! ```ignore
//! let index = people.new_index(
//!     "byName",
//!     vec![FieldIndexer::new(name).with_tokenizer(whitespace_tokenizer).with_transform(to_lower)],
//! );
//! ```
//!
//! # Query Plans
//!
//! [`Collection::find`] and [`Collection::iterate`] choose between an index
//! scan with a residual per-document check (result scan) and a full table
//! scan. [`Collection::index_iterate`] walks index entries directly and
//! fails with [`Error::NoIndex`] when no index covers the query.
//!
//! # Modules
//!
//! - [`jsonld`] - JSON-LD processor trait, built-in expander, value extractor
//!
//! The storage layer lives in the `termdb-storage` crate; core value and key
//! types in `termdb-core`. The most used types are re-exported here.

#![deny(clippy::unwrap_used)]

mod collection;
mod context;
mod error;
mod index;
mod indexer;
pub mod jsonld;
mod plan;
mod query;
mod store;

pub use collection::{default_reference, Collection, ReferenceFn};
pub use context::Context;
pub use error::{Error, Result};
pub use index::Index;
pub use indexer::FieldIndexer;
pub use jsonld::{InlineContextProcessor, JsonLdProcessor};
pub use query::{Query, QueryPart};
pub use store::{Store, StoreConfig};

// Re-export core types
pub use termdb_core::{
    to_lower, whitespace_tokenizer, Document, Reference, Scalar, TermPath, Tokenizer, Transform,
};

// Re-export storage entry points for callers tuning the backend
pub use termdb_storage::backends::redb::{RedbConfig, RedbEngine};
pub use termdb_storage::{StorageEngine, StorageError};
