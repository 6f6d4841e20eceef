//! Query plans.
//!
//! A collection answers a query through one of three plans:
//!
//! - **Index scan**: walk matching index entries and emit references
//!   without touching the documents.
//! - **Result scan**: walk matching index entries, load each referenced
//!   document, and keep it only when the query parts *outside* the index
//!   also hold.
//! - **Full table scan**: walk the document bucket and evaluate every query
//!   part against every document.
//!
//! Document-side evaluation (full scans and residual checks) extracts the
//! scalars at each part's term path and compares them **without** any index
//! transform; transforms belong to an index part, and outside an index
//! there is none to apply. Transform-sensitive queries therefore agree
//! between index-backed and scanned plans only when the query value is
//! already in the transform's normal form.

use serde_json::Value;
use termdb_storage::{BucketPath, Cursor, Transaction};

use crate::collection::DOCUMENTS_BUCKET;
use crate::error::Result;
use crate::index::Index;
use crate::jsonld::{expand_document, values_at_path, JsonLdProcessor};
use crate::query::{Query, QueryPart};

/// The plan chosen for a query, borrowing the winning index if any.
#[derive(Debug)]
pub(crate) enum QueryPlan<'a> {
    /// Index scan with a residual per-document check.
    ResultScan {
        /// The best-scoring index.
        index: &'a Index,
    },
    /// No index applies; scan the document bucket.
    FullTableScan,
}

/// Execute a result scan: iterate the index, load each referenced document,
/// and emit those whose residual query parts hold.
pub(crate) fn execute_result_scan<T, F>(
    tx: &T,
    collection: &BucketPath,
    processor: &dyn JsonLdProcessor,
    index: &Index,
    query: &Query,
    walker: &mut F,
) -> Result<()>
where
    T: Transaction,
    F: FnMut(&[u8], &[u8]) -> Result<()>,
{
    let residual = index.query_parts_outside_index(query);
    let documents = collection.child(DOCUMENTS_BUCKET);

    index.iterate(tx, collection, query, |reference, _key| {
        let Some(document) = tx.get(&documents, reference)? else {
            // the index entry has no backing document; nothing to emit
            return Ok(());
        };
        if !residual.is_empty() {
            let expanded = expand_document(processor, &document)?;
            if !parts_hold(&expanded, &residual)? {
                return Ok(());
            }
        }
        walker(reference, &document)
    })
}

/// Execute a full table scan: evaluate every query part against every
/// document in the collection.
pub(crate) fn execute_full_table_scan<T, F>(
    tx: &T,
    collection: &BucketPath,
    processor: &dyn JsonLdProcessor,
    query: &Query,
    walker: &mut F,
) -> Result<()>
where
    T: Transaction,
    F: FnMut(&[u8], &[u8]) -> Result<()>,
{
    let documents = collection.child(DOCUMENTS_BUCKET);
    let parts: Vec<&QueryPart> = query.parts().iter().collect();

    let mut cursor = tx.cursor(&documents)?;
    let mut entry = cursor.seek_first()?;
    while let Some((reference, value)) = entry {
        if let Some(document) = value {
            let expanded = expand_document(processor, &document)?;
            if parts_hold(&expanded, &parts)? {
                walker(&reference, &document)?;
            }
        }
        entry = cursor.next()?;
    }
    Ok(())
}

/// Whether every part is satisfied by at least one value at its term path.
fn parts_hold(expanded: &[Value], parts: &[&QueryPart]) -> Result<bool> {
    for part in parts {
        let values = values_at_path(expanded, part.term_path())?;
        let satisfied = values.iter().any(|value| part.condition(&value.to_bytes(), None));
        if !satisfied {
            return Ok(false);
        }
    }
    Ok(true)
}
