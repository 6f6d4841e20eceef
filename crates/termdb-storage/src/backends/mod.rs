//! Storage backend implementations.

pub mod redb;

pub use redb::RedbEngine;
