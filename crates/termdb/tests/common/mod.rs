//! Shared fixtures and assertions for integration tests.

#![allow(dead_code)]

use serde_json::Value;
use termdb::jsonld::JsonLdProcessor;
use termdb::{
    Document, Index, InlineContextProcessor, Reference, RedbEngine, Store, TermPath,
};
use termdb_storage::{BucketPath, Cursor, StorageEngine, Transaction};

/// A person document with an inline context, a typed boolean, an `@id`-typed
/// url, and a nested child node.
pub const JSON_LD_EXAMPLE: &str = r#"{
  "@context": [
    {"@vocab": "http://schema.org/"},
    {
      "xsd": "http://www.w3.org/2001/XMLSchema#",
      "url": {"@id": "url", "@type": "@id"},
      "alive": {"@id": "alive", "@type": "xsd:boolean"}
    }
  ],
  "@type": "Person",
  "name": "Jane Doe",
  "jobTitle": "Professor",
  "telephone": "(425) 123-4567",
  "url": "http://www.janedoe.com",
  "weight": 80,
  "alive": true,
  "children": [
    {
      "name": "John Doe"
    }
  ]
}"#;

/// A second person sharing the telephone value, without url or children.
pub const JSON_LD_EXAMPLE_2: &str = r#"{
  "@context": {"@vocab": "http://schema.org/"},
  "@type": "Person",
  "name": "John Doe",
  "jobTitle": "Soldier",
  "telephone": "(425) 123-4567",
  "weight": 90
}"#;

pub fn example_doc() -> Document {
    Document::from(JSON_LD_EXAMPLE)
}

pub fn example_doc_2() -> Document {
    Document::from(JSON_LD_EXAMPLE_2)
}

pub fn name_path() -> TermPath {
    TermPath::new(["http://schema.org/name"])
}

pub fn url_path() -> TermPath {
    TermPath::new(["http://schema.org/url"])
}

pub fn child_name_path() -> TermPath {
    TermPath::new(["http://schema.org/children", "http://schema.org/name"])
}

pub fn test_store() -> Store {
    Store::in_memory().expect("failed to create in-memory store")
}

/// The collection bucket used by index-level tests.
pub fn test_root() -> BucketPath {
    BucketPath::new(["test"])
}

/// Expand a document the way collections do.
pub fn expand(document: &Document) -> Vec<Value> {
    let parsed: Value = serde_json::from_slice(document.as_bytes()).expect("valid json");
    InlineContextProcessor::new().expand(&parsed).expect("expansion")
}

/// Assert that `index` holds `reference` under the compound `key`.
pub fn assert_indexed(engine: &RedbEngine, root: &BucketPath, index: &Index, key: &[u8], reference: &Reference) {
    let tx = engine.begin_read().expect("begin read");
    let bucket = index.bucket_path(root).child(key);
    let entry = tx.get(&bucket, reference.as_bytes()).expect("get");
    assert!(
        entry.is_some(),
        "reference {reference} not indexed under key {:?} in {}",
        String::from_utf8_lossy(key),
        index.name(),
    );
}

/// Assert the total number of `(key, reference)` entries in `index`.
pub fn assert_index_size(engine: &RedbEngine, root: &BucketPath, index: &Index, expected: usize) {
    let tx = engine.begin_read().expect("begin read");
    let bucket = index.bucket_path(root);

    let mut count = 0;
    let mut keys = tx.cursor(&bucket).expect("cursor");
    let mut entry = keys.seek_first().expect("seek_first");
    while let Some((key, value)) = entry {
        assert!(value.is_none(), "index buckets hold only nested ref buckets");
        let mut refs = tx.cursor(&bucket.child(&key)).expect("ref cursor");
        let mut reference = refs.seek_first().expect("seek_first");
        while reference.is_some() {
            count += 1;
            reference = refs.next().expect("next");
        }
        entry = keys.next().expect("next");
    }

    assert_eq!(expected, count, "index {} size", index.name());
}

/// Assert the number of stored documents in a collection.
pub fn assert_document_count(engine: &RedbEngine, collection: &str, expected: usize) {
    let tx = engine.begin_read().expect("begin read");
    let bucket = BucketPath::new([collection, "_documents"]);

    let mut count = 0;
    let mut cursor = tx.cursor(&bucket).expect("cursor");
    let mut entry = cursor.seek_first().expect("seek_first");
    while entry.is_some() {
        count += 1;
        entry = cursor.next().expect("next");
    }

    assert_eq!(expected, count, "document count in {collection}");
}
