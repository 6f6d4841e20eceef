//! Bucket paths addressing nested buckets.

use std::fmt;

/// The address of a bucket: an ordered list of byte-string segments from the
/// outermost bucket to the innermost.
///
/// Segments are arbitrary bytes; index implementations use packed compound
/// keys as bucket names, so no character restrictions apply.
///
/// # Example
///
/// ```
/// use termdb_storage::BucketPath;
///
/// let collection = BucketPath::new(["people"]);
/// let documents = collection.child("_documents");
/// assert_eq!(documents.segments().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BucketPath {
    segments: Vec<Vec<u8>>,
}

impl BucketPath {
    /// The root of the bucket tree (no segments).
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Create a path from a sequence of segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        Self { segments: segments.into_iter().map(|s| s.as_ref().to_vec()).collect() }
    }

    /// A new path with `segment` appended.
    #[must_use]
    pub fn child(&self, segment: impl AsRef<[u8]>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.as_ref().to_vec());
        Self { segments }
    }

    /// The path's segments, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[Vec<u8>] {
        &self.segments
    }

    /// Number of segments.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for BucketPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            f.write_str(&String::from_utf8_lossy(segment))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_appends_segment() {
        let path = BucketPath::new(["a"]).child("b").child([0x10u8, 0x00]);
        assert_eq!(path.depth(), 3);
        assert_eq!(path.segments()[2], vec![0x10, 0x00]);
    }

    #[test]
    fn root_is_empty() {
        assert_eq!(BucketPath::root().depth(), 0);
    }
}
