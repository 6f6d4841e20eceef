//! Physical key encoding for the nested bucket emulation.
//!
//! All entries live in one physical table. An entry with key `k` in the
//! bucket `[s1, s2]` is stored under the physical key
//!
//! ```text
//! enc(s1) enc(s2) enc(k)
//! ```
//!
//! where `enc` escapes each segment byte-wise (`0x00` → `0x01 0x01`,
//! `0x01` → `0x01 0x02`, everything else verbatim) and appends a `0x00`
//! terminator. The escape keeps two properties the cursor protocol relies on:
//!
//! - **Unambiguous framing**: encoded segment content never contains a bare
//!   `0x00`, so the terminator always marks a segment boundary.
//! - **Order preservation**: for segments `a < b`, `enc(a) < enc(b)` under
//!   byte-lexicographic comparison, and a segment sorts before every segment
//!   it is a proper prefix of.
//!
//! Consequences: a bucket's subtree is the contiguous physical range
//! `[prefix, prefix_end(prefix))`, and the children of a bucket appear in
//! the order of their raw keys. A child that is itself a bucket occupies the
//! range starting `prefix enc(child) `, which a cursor skips by seeking to
//! [`skip_key`].

use redb::TableDefinition;

use crate::engine::BucketPath;

/// The single physical table holding the whole bucket tree.
pub const DATA_TABLE: TableDefinition<'static, &[u8], &[u8]> = TableDefinition::new("termdb_data");

/// Terminates every encoded segment. Never occurs inside encoded content.
const TERMINATOR: u8 = 0x00;

/// Introduces a two-byte escape pair inside encoded content.
const ESCAPE: u8 = 0x01;

/// Append the order-preserving encoding of `segment` (including the
/// terminator) to `out`.
pub fn push_segment(out: &mut Vec<u8>, segment: &[u8]) {
    for &byte in segment {
        match byte {
            TERMINATOR => out.extend_from_slice(&[ESCAPE, 0x01]),
            ESCAPE => out.extend_from_slice(&[ESCAPE, 0x02]),
            other => out.push(other),
        }
    }
    out.push(TERMINATOR);
}

/// The physical key prefix shared by everything below `bucket`.
#[must_use]
pub fn bucket_prefix(bucket: &BucketPath) -> Vec<u8> {
    let mut prefix = Vec::new();
    for segment in bucket.segments() {
        push_segment(&mut prefix, segment);
    }
    prefix
}

/// The physical key of the entry `key` in `bucket`.
#[must_use]
pub fn entry_key(bucket: &BucketPath, key: &[u8]) -> Vec<u8> {
    let mut physical = bucket_prefix(bucket);
    push_segment(&mut physical, key);
    physical
}

/// The exclusive upper bound of the physical range starting at `prefix`,
/// or `None` when the range is unbounded (the root prefix).
#[must_use]
pub fn prefix_end(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.last_mut() {
        if *last < 0xFF {
            *last += 1;
            return Some(end);
        }
        end.pop();
    }
    None
}

/// The smallest physical key past the subtree of the child `segment` under
/// `prefix`. Seeking here advances a cursor to the next sibling.
#[must_use]
pub fn skip_key(prefix: &[u8], segment: &[u8]) -> Vec<u8> {
    let mut key = prefix.to_vec();
    push_segment(&mut key, segment);
    // the subtree shares `... enc(segment) 0x00`; bumping the terminator
    // steps over all of it
    if let Some(last) = key.last_mut() {
        *last = TERMINATOR + 1;
    }
    key
}

/// The physical position at which the children of `bucket` with key
/// `>= key` begin.
#[must_use]
pub fn seek_key(prefix: &[u8], key: &[u8]) -> Vec<u8> {
    let mut physical = prefix.to_vec();
    push_segment(&mut physical, key);
    // drop the terminator: children equal to `key` start exactly here, and
    // every longer child key encodes to something greater
    physical.pop();
    physical
}

/// Decode the first segment of `encoded`, returning the raw segment bytes
/// and the number of encoded bytes consumed (terminator included).
///
/// Returns `None` on malformed input (truncated escape or missing
/// terminator), which indicates corruption.
#[must_use]
pub fn decode_segment(encoded: &[u8]) -> Option<(Vec<u8>, usize)> {
    let mut segment = Vec::new();
    let mut i = 0;

    while i < encoded.len() {
        match encoded[i] {
            TERMINATOR => return Some((segment, i + 1)),
            ESCAPE => {
                match encoded.get(i + 1) {
                    Some(0x01) => segment.push(TERMINATOR),
                    Some(0x02) => segment.push(ESCAPE),
                    _ => return None,
                }
                i += 2;
            }
            other => {
                segment.push(other);
                i += 1;
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(segment: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        push_segment(&mut out, segment);
        out
    }

    #[test]
    fn segment_roundtrip() {
        for segment in [
            b"".as_slice(),
            b"abc".as_slice(),
            &[0x00],
            &[0x01],
            &[0x00, 0x01, 0x02, 0xFF],
            &[0xFF, 0x00, 0xFF],
        ] {
            let encoded = enc(segment);
            let (decoded, consumed) = decode_segment(&encoded).expect("roundtrip");
            assert_eq!(decoded, segment);
            assert_eq!(consumed, encoded.len());
        }
    }

    #[test]
    fn encoded_content_never_contains_bare_terminator() {
        let encoded = enc(&[0x00, 0x00, 0x01]);
        assert_eq!(encoded.iter().filter(|&&b| b == TERMINATOR).count(), 1);
        assert_eq!(encoded.last(), Some(&TERMINATOR));
    }

    #[test]
    fn encoding_preserves_segment_order() {
        let cases: &[&[u8]] = &[
            b"",
            &[0x00],
            &[0x00, 0x00],
            &[0x01],
            &[0x02],
            b"a",
            b"a\x00x",
            b"ab",
            b"b",
            &[0xFF],
        ];
        for pair in cases.windows(2) {
            assert!(
                enc(pair[0]) < enc(pair[1]),
                "{:?} should encode below {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn subtree_is_contiguous_under_prefix() {
        let bucket = BucketPath::new(["coll", "idx"]);
        let prefix = bucket_prefix(&bucket);
        let end = prefix_end(&prefix).expect("bounded");

        let inner = entry_key(&bucket.child(b"key\x10sub".as_slice()), b"ref");
        let direct = entry_key(&bucket, b"ref");
        let outside = entry_key(&BucketPath::new(["coll", "idy"]), b"ref");

        assert!(inner.as_slice() >= prefix.as_slice() && inner.as_slice() < end.as_slice());
        assert!(direct.as_slice() >= prefix.as_slice() && direct.as_slice() < end.as_slice());
        assert!(outside.as_slice() >= end.as_slice());
    }

    #[test]
    fn skip_key_steps_over_subtree() {
        let bucket = BucketPath::new(["coll"]);
        let prefix = bucket_prefix(&bucket);

        let child_entry = entry_key(&bucket.child("sub"), b"k");
        let skip = skip_key(&prefix, b"sub");
        let sibling = entry_key(&bucket, b"sub2");

        assert!(child_entry.as_slice() < skip.as_slice());
        assert!(skip.as_slice() <= sibling.as_slice());
    }

    #[test]
    fn seek_key_lands_at_or_before_matching_child() {
        let bucket = BucketPath::new(["coll"]);
        let prefix = bucket_prefix(&bucket);

        let exact = entry_key(&bucket, b"jane");
        let longer = entry_key(&bucket, b"jane doe");
        let smaller = entry_key(&bucket, b"jan");

        let seek = seek_key(&prefix, b"jane");
        assert!(seek.as_slice() <= exact.as_slice());
        assert!(seek.as_slice() <= longer.as_slice());
        assert!(seek.as_slice() > smaller.as_slice());
    }

    #[test]
    fn root_prefix_is_unbounded() {
        assert_eq!(prefix_end(&[]), None);
        let prefix = bucket_prefix(&BucketPath::new(["a"]));
        assert!(prefix_end(&prefix).is_some());
    }
}
