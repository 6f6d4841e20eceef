//! Key encoding for ordered storage.

mod compound;

pub use compound::{pack_key, unpack_key, KEY_DELIMITER};
