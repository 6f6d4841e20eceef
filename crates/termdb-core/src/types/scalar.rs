//! The scalar value type documents are indexed on.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A JSON-LD scalar: a boolean, a string, or a number.
///
/// Scalars are the only values that can appear in an index key. Each variant
/// has a canonical byte encoding (see [`Scalar::to_bytes`]), and comparison
/// semantics are defined **through that encoding only**: two scalars are
/// equal exactly when their encodings are equal, and they order by
/// byte-lexicographic comparison of their encodings. This matches the order
/// in which index keys are laid out in storage.
///
/// # Example
///
/// ```
/// use termdb_core::Scalar;
///
/// assert_eq!(Scalar::from(true).to_bytes(), vec![0x01]);
/// assert_eq!(Scalar::from("abc").to_bytes(), b"abc");
/// assert_eq!(Scalar::from(80.0).to_bytes(), 80.0_f64.to_bits().to_be_bytes());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Scalar {
    /// Boolean value.
    Bool(bool),
    /// UTF-8 string.
    String(String),
    /// 64-bit floating point number. JSON numbers parse into this variant.
    Float(f64),
}

impl Scalar {
    /// Parse a JSON value into a scalar.
    ///
    /// Accepts booleans, strings, and numbers. Any other value kind
    /// (null, array, object) fails with [`CoreError::InvalidValue`].
    pub fn parse(value: &serde_json::Value) -> Result<Self, CoreError> {
        match value {
            serde_json::Value::Bool(b) => Ok(Self::Bool(*b)),
            serde_json::Value::String(s) => Ok(Self::String(s.clone())),
            serde_json::Value::Number(n) => {
                n.as_f64().map(Self::Float).ok_or(CoreError::InvalidValue)
            }
            _ => Err(CoreError::InvalidValue),
        }
    }

    /// The canonical byte encoding used as index key material.
    ///
    /// - booleans encode as one byte, `0x00` or `0x01`
    /// - strings encode as their UTF-8 bytes, no terminator
    /// - doubles encode as the big-endian IEEE-754 bit pattern
    ///
    /// The double encoding sorts numerically for non-negative values only;
    /// negative doubles sort after positive ones and among themselves in
    /// reverse. Callers indexing negative numbers should apply a
    /// sign-flipping transform to both indexed and query values.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Bool(b) => vec![u8::from(*b)],
            Self::String(s) => s.as_bytes().to_vec(),
            Self::Float(f) => f.to_bits().to_be_bytes().to_vec(),
        }
    }

    /// The string content, if this scalar is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for Scalar {}

impl PartialOrd for Scalar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scalar {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_bytes().cmp(&other.to_bytes())
    }
}

impl Hash for Scalar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_bytes().hash(state);
    }
}
