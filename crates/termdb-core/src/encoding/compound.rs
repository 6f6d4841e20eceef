//! Compound key packing for multi-part index keys.
//!
//! An index over `n` field indexers stores one key per document built from
//! `n` encoded scalar parts. The parts are joined with a reserved delimiter
//! byte so that byte-lexicographic ordering of packed keys follows the
//! ordering of the part tuples, and so that a seek positioned at a packed
//! prefix lands at the first key sharing those leading parts.
//!
//! # Key Format
//!
//! ```text
//! [part 1][0x10][part 2][0x10]...[0x10][part n]
//! ```
//!
//! Part content is escaped byte-wise (`0x10` → `0x11 0x01`, `0x11` →
//! `0x11 0x02`, everything else verbatim), so the delimiter never occurs
//! inside an encoded part and [`pack_key`]/[`unpack_key`] round-trip exactly
//! for arbitrary part bytes, empty parts included. Packed ordering matches
//! tuple ordering for parts without bytes at or below `0x11`; term IRIs and
//! human-readable values never contain such bytes in practice.

/// The reserved byte separating compound key parts.
pub const KEY_DELIMITER: u8 = 0x10;

/// Introduces a two-byte escape pair inside encoded part content.
const ESCAPE: u8 = 0x11;

/// Pack a tuple of byte strings into a single ordered key.
///
/// Parts are joined with [`KEY_DELIMITER`]; delimiter and escape bytes
/// inside a part are escaped. An empty part list produces an empty key.
///
/// # Example
///
/// ```
/// use termdb_core::encoding::{pack_key, unpack_key};
///
/// let key = pack_key(&[b"Jane Doe".as_slice(), b"".as_slice()]);
/// assert_eq!(key, b"Jane Doe\x10");
/// assert_eq!(unpack_key(&key), vec![b"Jane Doe".to_vec(), Vec::new()]);
/// ```
#[must_use]
pub fn pack_key<P: AsRef<[u8]>>(parts: &[P]) -> Vec<u8> {
    let total: usize = parts.iter().map(|p| p.as_ref().len() + 1).sum();
    let mut key = Vec::with_capacity(total);

    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            key.push(KEY_DELIMITER);
        }
        for &byte in part.as_ref() {
            match byte {
                KEY_DELIMITER => key.extend_from_slice(&[ESCAPE, 0x01]),
                ESCAPE => key.extend_from_slice(&[ESCAPE, 0x02]),
                other => key.push(other),
            }
        }
    }

    key
}

/// Unpack a compound key into its parts.
///
/// The exact reverse of [`pack_key`]: delimiters split parts, escape pairs
/// decode to their literal byte. An empty key decodes to a single empty
/// part (the packed form of `[""]`). Malformed escape pairs, which packed
/// keys never contain, decode byte-for-byte.
#[must_use]
pub fn unpack_key(key: &[u8]) -> Vec<Vec<u8>> {
    let mut parts = Vec::new();
    let mut current = Vec::new();
    let mut i = 0;

    while i < key.len() {
        match key[i] {
            KEY_DELIMITER => {
                parts.push(std::mem::take(&mut current));
                i += 1;
            }
            ESCAPE => {
                match key.get(i + 1) {
                    Some(0x01) => {
                        current.push(KEY_DELIMITER);
                        i += 2;
                    }
                    Some(0x02) => {
                        current.push(ESCAPE);
                        i += 2;
                    }
                    _ => {
                        current.push(ESCAPE);
                        i += 1;
                    }
                }
            }
            other => {
                current.push(other);
                i += 1;
            }
        }
    }
    parts.push(current);

    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_single_part() {
        assert_eq!(pack_key(&[b"Jane Doe".as_slice()]), b"Jane Doe".to_vec());
    }

    #[test]
    fn pack_joins_with_delimiter() {
        let key = pack_key(&[b"a".as_slice(), b"b".as_slice(), b"c".as_slice()]);
        assert_eq!(key, b"a\x10b\x10c".to_vec());
    }

    #[test]
    fn pack_keeps_empty_parts() {
        let key = pack_key(&[b"a".as_slice(), b"".as_slice(), b"c".as_slice()]);
        assert_eq!(key, b"a\x10\x10c".to_vec());
        assert_eq!(unpack_key(&key), vec![b"a".to_vec(), Vec::new(), b"c".to_vec()]);
    }

    #[test]
    fn all_empty_parts_roundtrip() {
        let key = pack_key(&[b"".as_slice(), b"", b""]);
        assert_eq!(key, vec![KEY_DELIMITER, KEY_DELIMITER]);
        assert_eq!(unpack_key(&key), vec![Vec::<u8>::new(), Vec::new(), Vec::new()]);
    }

    #[test]
    fn delimiter_bytes_are_escaped() {
        let part = vec![0x01, KEY_DELIMITER, 0x02];
        let key = pack_key(&[part.as_slice(), b"x".as_slice()]);
        assert_eq!(key, vec![0x01, ESCAPE, 0x01, 0x02, KEY_DELIMITER, b'x']);
        assert_eq!(unpack_key(&key), vec![part, b"x".to_vec()]);
    }

    #[test]
    fn escape_bytes_are_escaped() {
        let part = vec![ESCAPE, KEY_DELIMITER, ESCAPE];
        let key = pack_key(&[part.as_slice()]);
        assert_eq!(unpack_key(&key), vec![part]);
    }

    #[test]
    fn unpack_trailing_delimiter_yields_empty_last_part() {
        assert_eq!(unpack_key(b"a\x10"), vec![b"a".to_vec(), Vec::new()]);
    }

    #[test]
    fn packed_keys_sort_by_tuple_order() {
        let a = pack_key(&[b"jane".as_slice(), b"doe".as_slice()]);
        let b = pack_key(&[b"jane".as_slice(), b"smith".as_slice()]);
        let c = pack_key(&[b"john".as_slice(), b"doe".as_slice()]);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn packed_prefix_positions_before_extensions() {
        // a seek at pack([p1]) lands at or before every key whose first part is p1
        let prefix = pack_key(&[b"jane".as_slice()]);
        let full = pack_key(&[b"jane".as_slice(), b"doe".as_slice()]);
        assert!(prefix.as_slice() < full.as_slice());
        assert!(full.starts_with(&prefix));
    }
}
