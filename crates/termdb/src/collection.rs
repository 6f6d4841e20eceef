//! Collections of documents and their indices.

use std::sync::Arc;

use sha1::{Digest, Sha1};
use tracing::debug;

use termdb_core::{Document, Reference, Scalar, TermPath};
use termdb_storage::backends::redb::RedbEngine;
use termdb_storage::{BucketPath, Cursor, StorageEngine, Transaction};

use crate::context::Context;
use crate::error::{Error, Result};
use crate::index::Index;
use crate::indexer::FieldIndexer;
use crate::jsonld::{expand_document, values_at_path, JsonLdProcessor};
use crate::plan::{execute_full_table_scan, execute_result_scan, QueryPlan};
use crate::query::Query;

/// The bucket that stores the documents of a collection.
pub(crate) const DOCUMENTS_BUCKET: &str = "_documents";

/// Creates the reference a document is stored under.
///
/// References must be deterministic; the choice controls access order (a
/// content hash for random access, a sequence for chronological access).
pub type ReferenceFn = fn(&[u8]) -> Reference;

/// The default reference function: SHA-1 of the document bytes.
#[must_use]
pub fn default_reference(document: &[u8]) -> Reference {
    Reference::new(Sha1::digest(document).to_vec())
}

/// A logical collection of documents and the indices declared over them.
///
/// A collection is a handle onto the shared store; it owns no storage
/// itself. The index list lives on the handle and is consulted by value per
/// operation, so schema changes (`add_index`/`drop_index`) must be
/// serialized against queries by the caller.
///
/// Every operation runs in its own transaction of the underlying store.
pub struct Collection {
    name: String,
    engine: Arc<RedbEngine>,
    processor: Arc<dyn JsonLdProcessor>,
    indices: Vec<Index>,
    reference_fn: ReferenceFn,
}

impl Collection {
    pub(crate) fn new(
        name: String,
        engine: Arc<RedbEngine>,
        processor: Arc<dyn JsonLdProcessor>,
    ) -> Self {
        Self { name, engine, processor, indices: Vec::new(), reference_fn: default_reference }
    }

    /// Replace the reference function for this handle.
    #[must_use]
    pub fn with_reference_fn(mut self, reference_fn: ReferenceFn) -> Self {
        self.reference_fn = reference_fn;
        self
    }

    /// The collection name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The indices currently attached to this handle.
    #[must_use]
    pub fn indices(&self) -> &[Index] {
        &self.indices
    }

    /// Create a blank index over this collection's terms. With multiple
    /// parts a compound index is created. The index is not attached until
    /// [`add_index`](Collection::add_index).
    pub fn new_index(&self, name: impl Into<String>, parts: Vec<FieldIndexer>) -> Index {
        Index::new(name, parts)
    }

    /// Attach indices to this collection, back-filling each new index from
    /// the stored documents inside the same write transaction.
    ///
    /// Attaching an index whose name is already attached is a no-op; to
    /// replace an index, drop it first. Back-fill is skipped when the
    /// index bucket already holds entries from an earlier handle.
    ///
    /// # Errors
    ///
    /// Propagates extraction and storage errors; on error the transaction
    /// for the failing index is rolled back.
    pub fn add_index(&mut self, indices: impl IntoIterator<Item = Index>) -> Result<()> {
        for index in indices {
            if self.indices.iter().any(|i| i.name() == index.name()) {
                continue;
            }

            let root = self.bucket_path();
            let mut tx = self.engine.begin_write()?;

            if tx.bucket_is_empty(&index.bucket_path(&root))? {
                // collect first: the cursor borrows the transaction
                let entries = {
                    let mut cursor = tx.cursor(&root.child(DOCUMENTS_BUCKET))?;
                    let mut entries = Vec::new();
                    let mut entry = cursor.seek_first()?;
                    while let Some((reference, value)) = entry {
                        if let Some(document) = value {
                            entries.push((reference, document));
                        }
                        entry = cursor.next()?;
                    }
                    entries
                };

                let count = entries.len();
                for (reference, document) in entries {
                    let expanded = expand_document(&*self.processor, &document)?;
                    index.add(&mut tx, &root, &Reference::new(reference), &expanded)?;
                }
                debug!(index = index.name(), documents = count, "back-filled index");
            }

            tx.commit()?;
            self.indices.push(index);
        }
        Ok(())
    }

    /// Drop an index by name, removing its entries. Unknown names are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Propagates storage errors.
    pub fn drop_index(&mut self, name: &str) -> Result<()> {
        let root = self.bucket_path();
        let mut tx = self.engine.begin_write()?;

        if let Some(pos) = self.indices.iter().position(|i| i.name() == name) {
            let index = self.indices.remove(pos);
            tx.delete_bucket(&index.bucket_path(&root))?;
            debug!(index = name, "dropped index");
        }

        tx.commit()?;
        Ok(())
    }

    /// Add a set of documents in a single transaction, indexing each under
    /// every attached index. A document whose reference already exists
    /// overwrites the stored bytes silently.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidJson`] for unparseable documents; the whole
    /// set is rolled back on any error.
    pub fn add(&self, documents: &[Document]) -> Result<()> {
        let root = self.bucket_path();
        let documents_bucket = root.child(DOCUMENTS_BUCKET);
        let mut tx = self.engine.begin_write()?;

        for document in documents {
            let expanded = expand_document(&*self.processor, document.as_bytes())?;
            let reference = (self.reference_fn)(document.as_bytes());

            for index in &self.indices {
                index.add(&mut tx, &root, &reference, &expanded)?;
            }
            tx.put(&documents_bucket, reference.as_bytes(), document.as_bytes())?;
        }

        tx.commit()?;
        Ok(())
    }

    /// The stored document for `reference`, or `None`.
    ///
    /// # Errors
    ///
    /// Propagates storage errors.
    pub fn get(&self, reference: &Reference) -> Result<Option<Document>> {
        let tx = self.engine.begin_read()?;
        let documents_bucket = self.bucket_path().child(DOCUMENTS_BUCKET);
        Ok(tx.get(&documents_bucket, reference.as_bytes())?.map(Document::from))
    }

    /// Delete a document and its index entries. Deleting a document that
    /// was never added is not an error.
    ///
    /// # Errors
    ///
    /// Propagates extraction and storage errors.
    pub fn delete(&self, document: &Document) -> Result<()> {
        let root = self.bucket_path();
        let mut tx = self.engine.begin_write()?;

        if tx.bucket_is_empty(&root)? {
            return Ok(());
        }

        let reference = (self.reference_fn)(document.as_bytes());
        tx.delete(&root.child(DOCUMENTS_BUCKET), reference.as_bytes())?;

        if !self.indices.is_empty() {
            let expanded = expand_document(&*self.processor, document.as_bytes())?;
            for index in &self.indices {
                index.delete(&mut tx, &root, &reference, &expanded)?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Collect the documents matching `query`.
    ///
    /// `ctx` is consulted before each result is appended; once cancelled or
    /// past its deadline, the matching error is returned and the partial
    /// result discarded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoQuery`] for an empty query, cancellation errors
    /// from `ctx`, and anything [`iterate`](Collection::iterate) surfaces.
    pub fn find(&self, ctx: &Context, query: &Query) -> Result<Vec<Document>> {
        let mut documents = Vec::new();
        self.iterate(query, |_reference, document| {
            ctx.check()?;
            documents.push(Document::from(document));
            Ok(())
        })?;
        Ok(documents)
    }

    /// Walk the documents matching `query`, choosing between an index-backed
    /// result scan and a full table scan.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoQuery`] for an empty query; walker errors abort
    /// the iteration and propagate verbatim.
    pub fn iterate<F>(&self, query: &Query, mut walker: F) -> Result<()>
    where
        F: FnMut(&Reference, &[u8]) -> Result<()>,
    {
        let plan = self.plan(query)?;
        let root = self.bucket_path();
        let tx = self.engine.begin_read()?;
        let mut emit = |reference: &[u8], document: &[u8]| {
            walker(&Reference::from(reference), document)
        };

        match plan {
            QueryPlan::ResultScan { index } => {
                execute_result_scan(&tx, &root, &*self.processor, index, query, &mut emit)
            }
            QueryPlan::FullTableScan => {
                execute_full_table_scan(&tx, &root, &*self.processor, query, &mut emit)
            }
        }
    }

    /// Walk the raw index entries matching `query`, without loading
    /// documents. The query must be fully answerable by one index.
    ///
    /// The walker receives each document reference and the compound index
    /// key it was found under.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoIndex`] when no index covers the query's leading
    /// parts; walker errors propagate verbatim.
    pub fn index_iterate<F>(&self, query: &Query, mut walker: F) -> Result<()>
    where
        F: FnMut(&[u8], &[u8]) -> Result<()>,
    {
        let index = self.best_index(query).ok_or(Error::NoIndex)?;
        let tx = self.engine.begin_read()?;
        index.iterate(&tx, &self.bucket_path(), query, |reference, key| walker(reference, key))
    }

    /// The reference the configured reference function derives for a
    /// document.
    #[must_use]
    pub fn reference(&self, document: &Document) -> Reference {
        (self.reference_fn)(document.as_bytes())
    }

    /// The scalars found at `path` in the expanded form of `document`.
    ///
    /// An empty path yields no values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidJson`] for unparseable bytes and propagates
    /// expansion errors.
    pub fn values_at_path(&self, document: &Document, path: &TermPath) -> Result<Vec<Scalar>> {
        if path.is_empty() {
            return Ok(Vec::new());
        }
        let expanded = expand_document(&*self.processor, document.as_bytes())?;
        values_at_path(&expanded, path)
    }

    /// Choose the plan for a query: the best-scoring index drives a result
    /// scan; otherwise every document is scanned.
    fn plan(&self, query: &Query) -> Result<QueryPlan<'_>> {
        if query.is_empty() {
            return Err(Error::NoQuery);
        }
        Ok(match self.best_index(query) {
            Some(index) => QueryPlan::ResultScan { index },
            None => QueryPlan::FullTableScan,
        })
    }

    /// The attached index with the highest match score, if any scores above
    /// zero. The longest covered prefix wins.
    fn best_index(&self, query: &Query) -> Option<&Index> {
        let mut best: Option<&Index> = None;
        let mut best_score = 0.0f64;
        for index in &self.indices {
            let score = index.is_match(query);
            if score > best_score {
                best = Some(index);
                best_score = score;
            }
        }
        best
    }

    fn bucket_path(&self) -> BucketPath {
        BucketPath::new([self.name.as_str()])
    }
}
