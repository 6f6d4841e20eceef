//! Core data types.

mod document;
mod scalar;
mod term_path;

pub use document::{Document, Reference};
pub use scalar::Scalar;
pub use term_path::TermPath;
