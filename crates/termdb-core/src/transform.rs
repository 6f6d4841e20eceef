//! Value transforms and string tokenizers.
//!
//! A transform alters a value before it is indexed *and* before a query
//! value is compared against the index, so the two sides always agree. A
//! tokenizer splits a string value into multiple parts that are indexed
//! separately (e.g. the words of a sentence).

use crate::types::Scalar;

/// A pure function applied to indexed values and to matching query values.
pub type Transform = fn(Scalar) -> Scalar;

/// A pure function splitting a text into tokens.
pub type Tokenizer = fn(&str) -> Vec<String>;

/// Maps string scalars to lower case; leaves other scalars untouched.
#[must_use]
pub fn to_lower(scalar: Scalar) -> Scalar {
    match scalar {
        Scalar::String(s) => Scalar::String(s.to_lowercase()),
        other => other,
    }
}

/// Splits a text on Unicode whitespace, dropping empty tokens.
#[must_use]
pub fn whitespace_tokenizer(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_owned).collect()
}
