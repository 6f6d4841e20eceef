//! Term paths addressing nested locations in expanded documents.

use serde::{Deserialize, Serialize};

/// An ordered sequence of fully qualified IRIs describing a nested term
/// structure, from the outermost term (index 0) to the innermost.
///
/// The empty path denotes the current node's own scalar value.
///
/// # Example
///
/// ```
/// use termdb_core::TermPath;
///
/// let path = TermPath::new(["http://schema.org/children", "http://schema.org/name"]);
/// assert_eq!(path.head(), Some("http://schema.org/children"));
/// assert_eq!(path.terms().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermPath {
    terms: Vec<String>,
}

impl TermPath {
    /// Create a term path from a sequence of IRI terms.
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { terms: terms.into_iter().map(Into::into).collect() }
    }

    /// Returns `true` when the path has no terms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The first term, or `None` for the empty path.
    #[must_use]
    pub fn head(&self) -> Option<&str> {
        self.terms.first().map(String::as_str)
    }

    /// All terms, outermost first.
    #[must_use]
    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_of_empty_path() {
        assert_eq!(TermPath::default().head(), None);
        assert!(TermPath::default().is_empty());
    }

    #[test]
    fn equality_is_order_sensitive() {
        let a = TermPath::new(["x", "y"]);
        let b = TermPath::new(["y", "x"]);
        let c = TermPath::new(["x", "y"]);
        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn equality_is_length_sensitive() {
        assert_ne!(TermPath::new(["x"]), TermPath::new(["x", "y"]));
    }
}
