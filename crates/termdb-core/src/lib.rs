//! `termdb` Core
//!
//! This crate provides the fundamental types shared across the termdb
//! workspace:
//!
//! - **Scalars**: [`Scalar`], the tagged value type that documents are
//!   indexed on, with a canonical byte encoding used as index key material
//! - **Term paths**: [`TermPath`], the ordered list of fully qualified IRIs
//!   addressing a location inside an expanded JSON-LD document
//! - **Identifiers**: [`Reference`] (document hash) and [`Document`]
//!   (raw JSON-LD bytes)
//! - **Key encoding**: the compound key codec in [`encoding`] used by
//!   secondary indices
//! - **Transforms**: value transforms and string tokenizers in [`transform`]
//!
//! # Example
//!
//! ```
//! use termdb_core::{Scalar, TermPath};
//!
//! let name = TermPath::new(["http://schema.org/name"]);
//! assert_eq!(name.head(), Some("http://schema.org/name"));
//!
//! let value = Scalar::from("Jane Doe");
//! assert_eq!(value.to_bytes(), b"Jane Doe");
//! ```
//!
//! # Modules
//!
//! - [`types`] - Core data types ([`Scalar`], [`TermPath`], [`Reference`], [`Document`])
//! - [`encoding`] - Compound key packing for ordered storage
//! - [`transform`] - Value transforms and tokenizers
//! - [`error`] - Error types ([`CoreError`])

#![deny(clippy::unwrap_used)]

pub mod encoding;
pub mod error;
pub mod transform;
pub mod types;

pub use error::CoreError;
pub use transform::{to_lower, whitespace_tokenizer, Tokenizer, Transform};
pub use types::{Document, Reference, Scalar, TermPath};
