//! Documents and their references.

use std::fmt;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// An opaque identifier for a document within a collection.
///
/// References are the values stored in index entries and the keys under which
/// documents are stored. By default a reference is the SHA-1 of the document
/// bytes, but the creator function is injectable per collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Reference(Vec<u8>);

impl Reference {
    /// Wrap raw reference bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The raw bytes of the reference.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The size of the reference in bytes, e.g. 20 for a SHA-1.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for a zero-length reference.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hex-encode the reference for display and logging.
    #[must_use]
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(self.0.len() * 2);
        for byte in &self.0 {
            // infallible for String
            let _ = write!(out, "{byte:02x}");
        }
        out
    }
}

impl From<Vec<u8>> for Reference {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Reference {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for Reference {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// The raw byte representation of a JSON-LD document.
///
/// Documents are opaque to the engine except when values are extracted for
/// indexing or querying; they are stored and returned byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document(Vec<u8>);

impl Document {
    /// Wrap raw document bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The raw bytes of the document.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Unwrap into the raw bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Document {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Document {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

impl AsRef<[u8]> for Document {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_hex_encoding() {
        let reference = Reference::from(b"ref".as_slice());
        assert_eq!(reference.to_hex(), "726566");
    }

    #[test]
    fn reference_byte_size() {
        assert_eq!(Reference::from(b"ref".as_slice()).len(), 3);
    }

    #[test]
    fn document_roundtrip() {
        let doc = Document::from("{\"a\": 1}");
        assert_eq!(doc.as_bytes(), b"{\"a\": 1}");
    }
}
