//! Redb transaction and cursor implementation.
//!
//! This module provides the [`RedbTransaction`] type which implements the
//! [`Transaction`] trait for both read-only and read-write transactions, and
//! the [`RedbCursor`] iterating a bucket's immediate children.
//!
//! # Cursor strategy
//!
//! The iteration unit is a bucket child, not a physical row: a child that is
//! a nested bucket may cover thousands of physical entries that the cursor
//! must step over in one move. Each cursor advance therefore runs one
//! bounded range lookup starting at the resume position and derives the next
//! resume position from the child it found ([`paths::skip_key`]), so
//! skipping a subtree costs a tree descent instead of a scan.

use std::ops::Bound;

use redb::{ReadTransaction, ReadableTable, WriteTransaction};

use crate::engine::{BucketPath, Cursor, CursorResult, StorageError, Transaction};

use super::paths::{
    bucket_prefix, decode_segment, entry_key, prefix_end, seek_key, skip_key, DATA_TABLE,
};

/// A transaction for the Redb storage engine.
///
/// Wraps both read-only and read-write Redb transactions behind the
/// [`Transaction`] trait.
///
/// Note: we allow the `large_enum_variant` lint because boxing the write
/// transaction would add indirection on every operation, and transactions
/// are short-lived.
#[allow(clippy::large_enum_variant)]
pub enum RedbTransaction {
    /// A read-only transaction.
    Read(ReadTransaction),
    /// A read-write transaction.
    Write(WriteTransaction),
}

impl RedbTransaction {
    /// Create a new read-only transaction.
    pub const fn new_read(tx: ReadTransaction) -> Self {
        Self::Read(tx)
    }

    /// Create a new read-write transaction.
    pub const fn new_write(tx: WriteTransaction) -> Self {
        Self::Write(tx)
    }

    /// Read the value stored under a physical key.
    fn read_physical(&self, physical: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        match self {
            Self::Read(tx) => match tx.open_table(DATA_TABLE) {
                Ok(table) => table_get(&table, physical),
                // no data table means no data
                Err(redb::TableError::TableDoesNotExist(_)) => Ok(None),
                Err(e) => Err(StorageError::Internal(e.to_string())),
            },
            Self::Write(tx) => {
                let table =
                    tx.open_table(DATA_TABLE).map_err(|e| StorageError::Internal(e.to_string()))?;
                table_get(&table, physical)
            }
        }
    }

    /// The first physical entry in `[lower, upper)`.
    fn first_physical(
        &self,
        lower: &[u8],
        upper: Option<&[u8]>,
    ) -> Result<Option<(Vec<u8>, Vec<u8>)>, StorageError> {
        match self {
            Self::Read(tx) => match tx.open_table(DATA_TABLE) {
                Ok(table) => table_first(&table, lower, upper),
                Err(redb::TableError::TableDoesNotExist(_)) => Ok(None),
                Err(e) => Err(StorageError::Internal(e.to_string())),
            },
            Self::Write(tx) => {
                let table =
                    tx.open_table(DATA_TABLE).map_err(|e| StorageError::Internal(e.to_string()))?;
                table_first(&table, lower, upper)
            }
        }
    }
}

impl Transaction for RedbTransaction {
    type Cursor<'a>
        = RedbCursor<'a>
    where
        Self: 'a;

    fn get(&self, bucket: &BucketPath, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        self.read_physical(&entry_key(bucket, key))
    }

    fn put(&mut self, bucket: &BucketPath, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        match self {
            Self::Read(_) => Err(StorageError::ReadOnly),
            Self::Write(tx) => {
                let physical = entry_key(bucket, key);
                let mut table =
                    tx.open_table(DATA_TABLE).map_err(|e| StorageError::Internal(e.to_string()))?;
                table
                    .insert(physical.as_slice(), value)
                    .map_err(|e| StorageError::Internal(e.to_string()))?;
                Ok(())
            }
        }
    }

    fn delete(&mut self, bucket: &BucketPath, key: &[u8]) -> Result<bool, StorageError> {
        match self {
            Self::Read(_) => Err(StorageError::ReadOnly),
            Self::Write(tx) => {
                let physical = entry_key(bucket, key);
                let mut table =
                    tx.open_table(DATA_TABLE).map_err(|e| StorageError::Internal(e.to_string()))?;
                let result = match table.remove(physical.as_slice()) {
                    Ok(removed) => Ok(removed.is_some()),
                    Err(e) => Err(StorageError::Internal(e.to_string())),
                };
                result
            }
        }
    }

    fn delete_bucket(&mut self, bucket: &BucketPath) -> Result<(), StorageError> {
        match self {
            Self::Read(_) => Err(StorageError::ReadOnly),
            Self::Write(tx) => {
                let prefix = bucket_prefix(bucket);
                let end = prefix_end(&prefix);
                let mut table =
                    tx.open_table(DATA_TABLE).map_err(|e| StorageError::Internal(e.to_string()))?;

                // collect first: the table cannot be scanned and mutated at once
                let doomed = {
                    let bounds: (Bound<&[u8]>, Bound<&[u8]>) = (
                        Bound::Included(prefix.as_slice()),
                        end.as_deref().map_or(Bound::Unbounded, Bound::Excluded),
                    );
                    let range = table
                        .range::<&[u8]>(bounds)
                        .map_err(|e| StorageError::Internal(e.to_string()))?;

                    let mut keys = Vec::new();
                    for entry in range {
                        let (key, _) = entry.map_err(|e| StorageError::Internal(e.to_string()))?;
                        keys.push(key.value().to_vec());
                    }
                    keys
                };

                for key in doomed {
                    table
                        .remove(key.as_slice())
                        .map_err(|e| StorageError::Internal(e.to_string()))?;
                }
                Ok(())
            }
        }
    }

    fn bucket_is_empty(&self, bucket: &BucketPath) -> Result<bool, StorageError> {
        let prefix = bucket_prefix(bucket);
        let end = prefix_end(&prefix);
        Ok(self.first_physical(&prefix, end.as_deref())?.is_none())
    }

    fn cursor(&self, bucket: &BucketPath) -> Result<Self::Cursor<'_>, StorageError> {
        let prefix = bucket_prefix(bucket);
        let end = prefix_end(&prefix);
        Ok(RedbCursor { tx: self, prefix, end, state: CursorState::Unpositioned })
    }

    fn commit(self) -> Result<(), StorageError> {
        match self {
            // read transactions need no explicit commit
            Self::Read(_) => Ok(()),
            Self::Write(tx) => tx.commit().map_err(|e| StorageError::Transaction(e.to_string())),
        }
    }

    fn rollback(self) -> Result<(), StorageError> {
        match self {
            Self::Read(_) => Ok(()),
            Self::Write(tx) => {
                // abort result is irrelevant when rolling back
                drop(tx.abort());
                Ok(())
            }
        }
    }

    fn is_read_only(&self) -> bool {
        matches!(self, Self::Read(_))
    }
}

fn table_get<T>(table: &T, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    match table.get(key) {
        Ok(Some(value)) => Ok(Some(value.value().to_vec())),
        Ok(None) => Ok(None),
        Err(e) => Err(StorageError::Internal(e.to_string())),
    }
}

fn table_first<T>(
    table: &T,
    lower: &[u8],
    upper: Option<&[u8]>,
) -> Result<Option<(Vec<u8>, Vec<u8>)>, StorageError>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    let bounds: (Bound<&[u8]>, Bound<&[u8]>) =
        (Bound::Included(lower), upper.map_or(Bound::Unbounded, Bound::Excluded));
    let mut range =
        table.range::<&[u8]>(bounds).map_err(|e| StorageError::Internal(e.to_string()))?;
    match range.next() {
        Some(Ok((key, value))) => Ok(Some((key.value().to_vec(), value.value().to_vec()))),
        Some(Err(e)) => Err(StorageError::Internal(e.to_string())),
        None => Ok(None),
    }
}

/// Position of a [`RedbCursor`].
enum CursorState {
    /// No seek has happened yet.
    Unpositioned,
    /// Physical lower bound (inclusive) of the next fetch.
    Resume(Vec<u8>),
    /// Iteration is exhausted.
    Done,
}

/// A cursor over the immediate children of one bucket.
///
/// Children are derived from physical keys on the fly; nested buckets are
/// reported once (with a `None` value) and their subtrees skipped by seeking
/// past their physical range.
pub struct RedbCursor<'a> {
    tx: &'a RedbTransaction,
    /// Physical prefix of the bucket.
    prefix: Vec<u8>,
    /// Exclusive upper bound of the bucket's physical range.
    end: Option<Vec<u8>>,
    state: CursorState,
}

impl RedbCursor<'_> {
    /// Fetch the first child at or after the physical position `lower`.
    fn advance_from(&mut self, mut lower: Vec<u8>) -> CursorResult {
        loop {
            let Some((physical, value)) = self.tx.first_physical(&lower, self.end.as_deref())?
            else {
                self.state = CursorState::Done;
                return Ok(None);
            };

            let remainder = &physical[self.prefix.len()..];
            if remainder.is_empty() {
                // the parent bucket holds a plain entry under this bucket's
                // name; it is not a child of this bucket
                lower = physical;
                lower.push(0x00);
                continue;
            }

            let Some((segment, consumed)) = decode_segment(remainder) else {
                return Err(StorageError::Corruption("unterminated bucket segment".into()));
            };
            let is_leaf = consumed == remainder.len();

            self.state = CursorState::Resume(skip_key(&self.prefix, &segment));
            return Ok(Some((segment, is_leaf.then_some(value))));
        }
    }
}

impl Cursor for RedbCursor<'_> {
    fn seek(&mut self, key: &[u8]) -> CursorResult {
        let lower = seek_key(&self.prefix, key);
        self.advance_from(lower)
    }

    fn seek_first(&mut self) -> CursorResult {
        let lower = self.prefix.clone();
        self.advance_from(lower)
    }

    fn next(&mut self) -> CursorResult {
        match std::mem::replace(&mut self.state, CursorState::Done) {
            CursorState::Unpositioned => self.seek_first(),
            CursorState::Resume(lower) => self.advance_from(lower),
            CursorState::Done => Ok(None),
        }
    }
}
