//! JSON-LD expansion and value extraction.
//!
//! The engine never interprets raw documents directly: every document is
//! first brought into expanded form, where all terms are fully qualified
//! IRIs and values are wrapped as `@value`/`@id`/`@list`/`@set` nodes. The
//! expansion algorithm itself is a collaborator behind the
//! [`JsonLdProcessor`] trait; [`InlineContextProcessor`] is the built-in
//! implementation covering documents with inline contexts.
//!
//! [`values_at_path`] walks an expanded document and collects the scalars at
//! a term path; it is the basis of both indexing and full-scan query
//! evaluation.

mod expand;
mod extract;

pub use expand::InlineContextProcessor;
pub use extract::values_at_path;

use crate::error::{Error, Result};

/// A JSON-LD processor producing the expanded form of a document.
///
/// Implementations are injected at store construction; the engine depends
/// only on this contract. `expand` receives the parsed document and returns
/// the expanded node list.
pub trait JsonLdProcessor: Send + Sync {
    /// Expand a parsed JSON-LD document into its list of top-level nodes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Expand`] when the document cannot be expanded.
    fn expand(&self, document: &serde_json::Value) -> Result<Vec<serde_json::Value>>;
}

/// Parse raw document bytes and expand them.
///
/// # Errors
///
/// Returns [`Error::InvalidJson`] for unparseable bytes and propagates
/// processor errors.
pub(crate) fn expand_document(
    processor: &dyn JsonLdProcessor,
    document: &[u8],
) -> Result<Vec<serde_json::Value>> {
    let parsed: serde_json::Value =
        serde_json::from_slice(document).map_err(|_| Error::InvalidJson)?;
    processor.expand(&parsed)
}
