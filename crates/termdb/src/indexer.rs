//! Field indexing instructions.

use serde_json::Value;
use termdb_core::{Scalar, TermPath, Tokenizer, Transform};

use crate::error::Result;
use crate::jsonld::values_at_path;

/// The indexing instruction for one term of an index: which path to index,
/// and how to normalize the values found there.
///
/// The optional tokenizer splits a string value into parts that are indexed
/// separately (a sentence into words); the optional transform normalizes
/// each part (lower-casing) and is applied to query values against this part
/// as well.
///
/// # Example
///
/// ```
/// use termdb::{to_lower, whitespace_tokenizer, FieldIndexer, TermPath};
///
/// let indexer = FieldIndexer::new(TermPath::new(["http://schema.org/name"]))
///     .with_tokenizer(whitespace_tokenizer)
///     .with_transform(to_lower);
/// ```
#[derive(Debug, Clone)]
pub struct FieldIndexer {
    term_path: TermPath,
    transform: Option<Transform>,
    tokenizer: Option<Tokenizer>,
}

impl FieldIndexer {
    /// An indexer over `term_path` with no transform and no tokenizer.
    #[must_use]
    pub fn new(term_path: TermPath) -> Self {
        Self { term_path, transform: None, tokenizer: None }
    }

    /// Normalize indexed values (and query values) with `transform`.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Split string values into separately indexed tokens.
    #[must_use]
    pub fn with_tokenizer(mut self, tokenizer: Tokenizer) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    /// The term path this indexer extracts from.
    #[must_use]
    pub fn term_path(&self) -> &TermPath {
        &self.term_path
    }

    /// The transform, for evaluating query conditions against this part.
    #[must_use]
    pub fn transform_fn(&self) -> Option<Transform> {
        self.transform
    }

    /// Split a scalar into tokens. Without a tokenizer, or for non-string
    /// scalars, the scalar passes through alone.
    #[must_use]
    pub fn tokenize(&self, scalar: Scalar) -> Vec<Scalar> {
        if let (Some(tokenizer), Scalar::String(text)) = (self.tokenizer, &scalar) {
            return tokenizer(text).into_iter().map(Scalar::from).collect();
        }
        vec![scalar]
    }

    /// Apply the transform, if any.
    #[must_use]
    pub fn transform(&self, scalar: Scalar) -> Scalar {
        match self.transform {
            Some(f) => f(scalar),
            None => scalar,
        }
    }

    /// The index keys this part derives from an expanded document: extract
    /// the scalars at the term path, tokenize each, transform each token.
    ///
    /// # Errors
    ///
    /// Propagates extraction errors.
    pub fn keys(&self, expanded: &[Value]) -> Result<Vec<Scalar>> {
        let values = values_at_path(expanded, &self.term_path)?;
        let mut keys = Vec::with_capacity(values.len());
        for value in values {
            for token in self.tokenize(value) {
                keys.push(self.transform(token));
            }
        }
        Ok(keys)
    }
}

/// Indexers compare by term path only; position in the index carries the
/// rest of their meaning.
impl PartialEq for FieldIndexer {
    fn eq(&self, other: &Self) -> bool {
        self.term_path == other.term_path
    }
}

impl Eq for FieldIndexer {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use termdb_core::{to_lower, whitespace_tokenizer};

    fn name_path() -> TermPath {
        TermPath::new(["http://schema.org/name"])
    }

    fn nodes() -> Vec<Value> {
        vec![json!({"http://schema.org/name": [{"@value": "Jane Doe"}]})]
    }

    #[test]
    fn keys_without_options_pass_values_through() {
        let indexer = FieldIndexer::new(name_path());
        let keys = indexer.keys(&nodes()).expect("keys");
        assert_eq!(keys, vec![Scalar::from("Jane Doe")]);
    }

    #[test]
    fn keys_tokenize_then_transform() {
        let indexer = FieldIndexer::new(name_path())
            .with_tokenizer(whitespace_tokenizer)
            .with_transform(to_lower);
        let keys = indexer.keys(&nodes()).expect("keys");
        assert_eq!(keys, vec![Scalar::from("jane"), Scalar::from("doe")]);
    }

    #[test]
    fn tokenize_leaves_non_strings_alone() {
        let indexer = FieldIndexer::new(name_path()).with_tokenizer(whitespace_tokenizer);
        assert_eq!(indexer.tokenize(Scalar::from(80.0)), vec![Scalar::from(80.0)]);
    }

    #[test]
    fn missing_path_yields_no_keys() {
        let indexer = FieldIndexer::new(TermPath::new(["http://schema.org/url"]));
        assert!(indexer.keys(&nodes()).expect("keys").is_empty());
    }

    #[test]
    fn indexers_compare_by_term_path() {
        let plain = FieldIndexer::new(name_path());
        let tokenized = FieldIndexer::new(name_path()).with_tokenizer(whitespace_tokenizer);
        assert_eq!(plain, tokenized);
    }
}
