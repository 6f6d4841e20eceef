//! Structured queries over indexed terms.

use termdb_core::{Scalar, TermPath, Transform};

/// One condition of a query: an exact match, an inclusive range, or a
/// prefix match on the scalars at a term path.
///
/// Each part exposes the scalar an index cursor seeks to and a predicate
/// over encoded key bytes. The optional transform mirrors whatever transform
/// the matched index part applied when the value was indexed, so both sides
/// compare in the same domain.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryPart {
    /// The value at the path equals the given scalar.
    Eq {
        /// The term path the condition applies to.
        term_path: TermPath,
        /// The scalar to match exactly.
        value: Scalar,
    },
    /// The value at the path lies in `[begin, end]`; both bounds inclusive.
    Range {
        /// The term path the condition applies to.
        term_path: TermPath,
        /// Inclusive lower bound.
        begin: Scalar,
        /// Inclusive upper bound.
        end: Scalar,
    },
    /// The value at the path starts with the given scalar's bytes.
    Prefix {
        /// The term path the condition applies to.
        term_path: TermPath,
        /// The prefix to match.
        value: Scalar,
    },
}

impl QueryPart {
    /// An exact-match part.
    pub fn eq(term_path: TermPath, value: impl Into<Scalar>) -> Self {
        Self::Eq { term_path, value: value.into() }
    }

    /// An inclusive range part.
    pub fn range(term_path: TermPath, begin: impl Into<Scalar>, end: impl Into<Scalar>) -> Self {
        Self::Range { term_path, begin: begin.into(), end: end.into() }
    }

    /// A prefix-match part.
    pub fn prefix(term_path: TermPath, value: impl Into<Scalar>) -> Self {
        Self::Prefix { term_path, value: value.into() }
    }

    /// The term path this part constrains.
    #[must_use]
    pub fn term_path(&self) -> &TermPath {
        match self {
            Self::Eq { term_path, .. }
            | Self::Range { term_path, .. }
            | Self::Prefix { term_path, .. } => term_path,
        }
    }

    /// The scalar an index cursor seeks to for this part.
    #[must_use]
    pub fn seek(&self) -> &Scalar {
        match self {
            Self::Eq { value, .. } | Self::Prefix { value, .. } => value,
            Self::Range { begin, .. } => begin,
        }
    }

    /// Whether the encoded key bytes satisfy this part.
    ///
    /// `transform` is the matched index part's transform, applied to this
    /// part's query value(s) before comparison; pass `None` outside an
    /// index.
    #[must_use]
    pub fn condition(&self, key: &[u8], transform: Option<Transform>) -> bool {
        match self {
            Self::Eq { value, .. } => key == apply(transform, value).to_bytes().as_slice(),
            Self::Range { begin, end, .. } => {
                let begin = apply(transform, begin).to_bytes();
                let end = apply(transform, end).to_bytes();
                key >= begin.as_slice() && key <= end.as_slice()
            }
            Self::Prefix { value, .. } => key.starts_with(&apply(transform, value).to_bytes()),
        }
    }
}

fn apply(transform: Option<Transform>, value: &Scalar) -> Scalar {
    match transform {
        Some(f) => f(value.clone()),
        None => value.clone(),
    }
}

/// A conjunction of [`QueryPart`]s: a document matches when every part is
/// satisfied by at least one of the values at the part's term path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    parts: Vec<QueryPart>,
}

impl Query {
    /// A query with one initial part.
    #[must_use]
    pub fn new(part: QueryPart) -> Self {
        Self { parts: vec![part] }
    }

    /// Add another condition; all conditions are implicitly AND-ed.
    #[must_use]
    pub fn and(mut self, part: QueryPart) -> Self {
        self.parts.push(part);
        self
    }

    /// The parts of this query, in insertion order.
    #[must_use]
    pub fn parts(&self) -> &[QueryPart] {
        &self.parts
    }

    /// Returns `true` for a query with no parts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}
