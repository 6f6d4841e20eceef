//! Secondary indices over term paths.

use serde_json::Value;
use termdb_core::encoding::{pack_key, unpack_key};
use termdb_core::{Reference, Scalar};
use termdb_storage::{BucketPath, Cursor, Transaction};

use crate::error::{Error, Result};
use crate::indexer::FieldIndexer;
use crate::query::{Query, QueryPart};

/// An ordered collection of [`FieldIndexer`]s maintaining a compound index
/// over one collection.
///
/// For each document the index stores one entry per element of the cross
/// product of its parts' key lists: the packed compound key names a nested
/// bucket whose keys are the references of the matching documents. A part
/// with no value for a document contributes a single empty key part; no two
/// parts of one index may share a term path.
///
/// Index order matters: queries can only use an index when they constrain a
/// leading run of its parts (see [`Index::is_match`]).
#[derive(Debug, Clone)]
pub struct Index {
    name: String,
    parts: Vec<FieldIndexer>,
}

impl Index {
    /// Create an index. With multiple parts a compound index is created.
    pub fn new(name: impl Into<String>, parts: Vec<FieldIndexer>) -> Self {
        Self { name: name.into(), parts }
    }

    /// The index name, unique within its collection.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The index parts, in index order.
    #[must_use]
    pub fn parts(&self) -> &[FieldIndexer] {
        &self.parts
    }

    /// The bucket holding this index's entries, nested under the collection
    /// bucket and named after the index.
    #[must_use]
    pub fn bucket_path(&self, collection: &BucketPath) -> BucketPath {
        collection.child(self.name.as_bytes())
    }

    /// Add the entries for one document.
    ///
    /// A document none of whose parts yield a value is not indexed.
    ///
    /// # Errors
    ///
    /// Propagates extraction and storage errors.
    pub fn add<T: Transaction>(
        &self,
        tx: &mut T,
        collection: &BucketPath,
        reference: &Reference,
        expanded: &[Value],
    ) -> Result<()> {
        let bucket = self.bucket_path(collection);
        for key in self.document_keys(expanded)? {
            tx.put(&bucket.child(key), reference.as_bytes(), &[])?;
        }
        Ok(())
    }

    /// Remove the entries for one document; the exact mirror of
    /// [`Index::add`]. Entries that are already absent are ignored.
    ///
    /// # Errors
    ///
    /// Propagates extraction and storage errors.
    pub fn delete<T: Transaction>(
        &self,
        tx: &mut T,
        collection: &BucketPath,
        reference: &Reference,
        expanded: &[Value],
    ) -> Result<()> {
        let bucket = self.bucket_path(collection);
        for key in self.document_keys(expanded)? {
            tx.delete(&bucket.child(key), reference.as_bytes())?;
        }
        Ok(())
    }

    /// How well this index covers `query`, in `[0, 1]`.
    ///
    /// The score is the number of *leading* index parts whose term paths
    /// appear somewhere in the query, divided by the number of parts. A
    /// query that does not constrain the first part scores `0.0`; a score of
    /// `1.0` means every part is constrained.
    #[must_use]
    pub fn is_match(&self, query: &Query) -> f64 {
        let mut matched = 0usize;
        for part in &self.parts {
            if query.parts().iter().any(|qp| qp.term_path() == part.term_path()) {
                matched += 1;
            } else {
                break;
            }
        }
        if matched == 0 {
            return 0.0;
        }
        matched as f64 / self.parts.len() as f64
    }

    /// The query parts reordered to this index's part order.
    ///
    /// Parts whose term path is not in the index are dropped, unless
    /// `include_missing` is set, in which case they are appended at the end
    /// in query order. When the primary (first) index part is not
    /// constrained and `include_missing` is unset, the result is empty.
    #[must_use]
    pub fn sort<'q>(&self, query: &'q Query, include_missing: bool) -> Vec<&'q QueryPart> {
        let primary_constrained = self
            .parts
            .first()
            .is_some_and(|p| query.parts().iter().any(|qp| qp.term_path() == p.term_path()));
        if !primary_constrained && !include_missing {
            return Vec::new();
        }

        let mut used = vec![false; query.parts().len()];
        let mut sorted = Vec::with_capacity(query.parts().len());
        for part in &self.parts {
            if let Some(pos) = query
                .parts()
                .iter()
                .position(|qp| qp.term_path() == part.term_path())
            {
                if !used[pos] {
                    used[pos] = true;
                    sorted.push(&query.parts()[pos]);
                }
            }
        }
        if include_missing {
            for (pos, part) in query.parts().iter().enumerate() {
                if !used[pos] {
                    sorted.push(part);
                }
            }
        }
        sorted
    }

    /// The query parts not covered by any index part; these remain to be
    /// checked against the documents themselves.
    #[must_use]
    pub fn query_parts_outside_index<'q>(&self, query: &'q Query) -> Vec<&'q QueryPart> {
        query
            .parts()
            .iter()
            .filter(|qp| !self.parts.iter().any(|p| p.term_path() == qp.term_path()))
            .collect()
    }

    /// Walk the index entries matching `query`, invoking `walker` with each
    /// document reference and the compound key it was found under.
    ///
    /// The cursor seeks to the packed transformed seek values of the leading
    /// constrained parts, then advances while keys can still match: a failed
    /// `Eq`/`Range` on the seek prefix behind passing equalities ends the
    /// scan, any other failure skips the key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoQuery`] when the query constrains no leading index
    /// part; propagates walker and storage errors.
    pub fn iterate<T, F>(
        &self,
        tx: &T,
        collection: &BucketPath,
        query: &Query,
        mut walker: F,
    ) -> Result<()>
    where
        T: Transaction,
        F: FnMut(&[u8], &[u8]) -> Result<()>,
    {
        // align each index part with the query part constraining it
        let aligned: Vec<Option<&QueryPart>> = self
            .parts
            .iter()
            .map(|part| query.parts().iter().find(|qp| qp.term_path() == part.term_path()))
            .collect();
        let lead = aligned.iter().take_while(|qp| qp.is_some()).count();
        if lead == 0 {
            return Err(Error::NoQuery);
        }

        let seek_parts: Vec<Vec<u8>> = aligned[..lead]
            .iter()
            .enumerate()
            .map(|(i, qp)| {
                let seek = qp.map(QueryPart::seek).cloned().unwrap_or(Scalar::from(""));
                self.parts[i].transform(seek).to_bytes()
            })
            .collect();
        let seek_key = pack_key(&seek_parts);

        let bucket = self.bucket_path(collection);
        let mut cursor = tx.cursor(&bucket)?;
        let mut entry = cursor.seek(&seek_key)?;

        'keys: while let Some((key, _)) = entry {
            let key_parts = unpack_key(&key);

            for (i, qp) in aligned.iter().enumerate() {
                let Some(qp) = qp else { continue };
                let part_bytes = key_parts.get(i).map_or(&[] as &[u8], Vec::as_slice);
                if qp.condition(part_bytes, self.parts[i].transform_fn()) {
                    continue;
                }

                // a failing equality or range on the seek prefix, behind
                // nothing but passing equalities, cannot match again
                let exhausted = i < lead
                    && !matches!(qp, QueryPart::Prefix { .. })
                    && aligned[..i].iter().all(|p| matches!(p, Some(QueryPart::Eq { .. })));
                if exhausted {
                    break 'keys;
                }
                entry = cursor.next()?;
                continue 'keys;
            }

            // all in-index conditions hold: emit every reference under the key
            let mut refs = tx.cursor(&bucket.child(&key))?;
            let mut reference = refs.seek_first()?;
            while let Some((ref_bytes, _)) = reference {
                walker(&ref_bytes, &key)?;
                reference = refs.next()?;
            }

            entry = cursor.next()?;
        }

        Ok(())
    }

    /// All packed compound keys for a document: the cross product of the
    /// per-part key lists, with empty parts for missing values.
    fn document_keys(&self, expanded: &[Value]) -> Result<Vec<Vec<u8>>> {
        let mut per_part: Vec<Vec<Vec<u8>>> = Vec::with_capacity(self.parts.len());
        let mut any_value = false;

        for part in &self.parts {
            let keys = part.keys(expanded)?;
            if keys.is_empty() {
                per_part.push(vec![Vec::new()]);
            } else {
                any_value = true;
                per_part.push(keys.iter().map(Scalar::to_bytes).collect());
            }
        }
        if !any_value {
            return Ok(Vec::new());
        }

        let mut tuples: Vec<Vec<Vec<u8>>> = vec![Vec::new()];
        for keys in &per_part {
            let mut extended = Vec::with_capacity(tuples.len() * keys.len());
            for tuple in &tuples {
                for key in keys {
                    let mut next = tuple.clone();
                    next.push(key.clone());
                    extended.push(next);
                }
            }
            tuples = extended;
        }

        Ok(tuples.iter().map(|tuple| pack_key(tuple)).collect())
    }
}
