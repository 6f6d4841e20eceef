//! Integration tests for index maintenance, scoring, and iteration.

mod common;

use common::*;

use termdb::{
    to_lower, whitespace_tokenizer, Error, FieldIndexer, Index, Query, QueryPart, RedbEngine,
    TermPath,
};
use termdb_core::encoding::pack_key;
use termdb_core::Reference;
use termdb_storage::backends::redb::RedbTransaction;
use termdb_storage::{StorageEngine, Transaction};

fn engine() -> RedbEngine {
    RedbEngine::in_memory().expect("failed to create engine")
}

fn reference_for(doc: &termdb::Document) -> Reference {
    termdb::default_reference(doc.as_bytes())
}

/// Run `f` inside a committed write transaction.
fn with_write<F: FnOnce(&mut RedbTransaction)>(engine: &RedbEngine, f: F) {
    let mut tx = engine.begin_write().expect("begin write");
    f(&mut tx);
    tx.commit().expect("commit");
}

// ============================================================================
// Add
// ============================================================================

#[test]
fn add_single_value_as_key() {
    let engine = engine();
    let root = test_root();
    let doc = example_doc();
    let reference = reference_for(&doc);
    let index = Index::new("byName", vec![FieldIndexer::new(name_path())]);

    with_write(&engine, |tx| {
        index.add(tx, &root, &reference, &expand(&doc)).expect("add");
    });

    assert_indexed(&engine, &root, &index, b"Jane Doe", &reference);
}

#[test]
fn add_compound_key_in_part_order() {
    let engine = engine();
    let root = test_root();
    let doc = example_doc();
    let reference = reference_for(&doc);
    let index = Index::new(
        "byUrlAndName",
        vec![FieldIndexer::new(url_path()), FieldIndexer::new(name_path())],
    );

    with_write(&engine, |tx| {
        index.add(tx, &root, &reference, &expand(&doc)).expect("add");
    });

    let key = pack_key(&[b"http://www.janedoe.com".as_slice(), b"Jane Doe"]);
    assert_indexed(&engine, &root, &index, &key, &reference);
}

#[test]
fn add_nested_value_through_recursion() {
    let engine = engine();
    let root = test_root();
    let doc = example_doc();
    let reference = reference_for(&doc);
    let index = Index::new(
        "byNameAndChild",
        vec![FieldIndexer::new(name_path()), FieldIndexer::new(child_name_path())],
    );

    with_write(&engine, |tx| {
        index.add(tx, &root, &reference, &expand(&doc)).expect("add");
    });

    let key = pack_key(&[b"Jane Doe".as_slice(), b"John Doe"]);
    assert_indexed(&engine, &root, &index, &key, &reference);
}

#[test]
fn add_same_key_for_multiple_documents() {
    let engine = engine();
    let root = test_root();
    let doc = example_doc();
    let doc2 = example_doc_2();
    let (ref1, ref2) = (reference_for(&doc), reference_for(&doc2));
    let index = Index::new(
        "byPhone",
        vec![FieldIndexer::new(TermPath::new(["http://schema.org/telephone"]))],
    );

    with_write(&engine, |tx| {
        index.add(tx, &root, &ref1, &expand(&doc)).expect("add");
        index.add(tx, &root, &ref2, &expand(&doc2)).expect("add");
    });

    assert_indexed(&engine, &root, &index, b"(425) 123-4567", &ref1);
    assert_indexed(&engine, &root, &index, b"(425) 123-4567", &ref2);
    assert_index_size(&engine, &root, &index, 2);
}

#[test]
fn document_without_any_value_is_not_indexed() {
    let engine = engine();
    let root = test_root();
    let doc = example_doc();
    let reference = reference_for(&doc);
    let index = Index::new(
        "byImage",
        vec![FieldIndexer::new(TermPath::new(["http://schema.org/image"]))],
    );

    with_write(&engine, |tx| {
        index.add(tx, &root, &reference, &expand(&doc)).expect("add");
    });

    assert_index_size(&engine, &root, &index, 0);
}

#[test]
fn missing_part_contributes_empty_key_part() {
    let engine = engine();
    let root = test_root();
    let doc = example_doc();
    let doc2 = example_doc_2();
    let index = Index::new(
        "byNameAndImage",
        vec![
            FieldIndexer::new(name_path()),
            FieldIndexer::new(TermPath::new(["http://schema.org/image"])),
        ],
    );

    with_write(&engine, |tx| {
        index.add(tx, &root, &reference_for(&doc), &expand(&doc)).expect("add");
        index.add(tx, &root, &reference_for(&doc2), &expand(&doc2)).expect("add");
    });

    let key = pack_key(&[b"Jane Doe".as_slice(), b""]);
    assert_indexed(&engine, &root, &index, &key, &reference_for(&doc));
    assert_index_size(&engine, &root, &index, 2);
}

#[test]
fn tokenized_part_indexes_every_word() {
    let engine = engine();
    let root = test_root();
    let doc = example_doc();
    let reference = reference_for(&doc);
    let index = Index::new(
        "byWord",
        vec![FieldIndexer::new(name_path())
            .with_tokenizer(whitespace_tokenizer)
            .with_transform(to_lower)],
    );

    with_write(&engine, |tx| {
        index.add(tx, &root, &reference, &expand(&doc)).expect("add");
    });

    assert_indexed(&engine, &root, &index, b"jane", &reference);
    assert_indexed(&engine, &root, &index, b"doe", &reference);
    assert_index_size(&engine, &root, &index, 2);
}

// ============================================================================
// Delete
// ============================================================================

#[test]
fn delete_removes_added_value() {
    let engine = engine();
    let root = test_root();
    let doc = example_doc();
    let reference = reference_for(&doc);
    let index = Index::new("byName", vec![FieldIndexer::new(name_path())]);

    with_write(&engine, |tx| {
        index.add(tx, &root, &reference, &expand(&doc)).expect("add");
        index.delete(tx, &root, &reference, &expand(&doc)).expect("delete");
    });

    assert_index_size(&engine, &root, &index, 0);
}

#[test]
fn delete_removes_nested_value() {
    let engine = engine();
    let root = test_root();
    let doc = example_doc();
    let reference = reference_for(&doc);
    let index = Index::new(
        "byNameAndChild",
        vec![FieldIndexer::new(name_path()), FieldIndexer::new(child_name_path())],
    );

    with_write(&engine, |tx| {
        index.add(tx, &root, &reference, &expand(&doc)).expect("add");
        index.delete(tx, &root, &reference, &expand(&doc)).expect("delete");
    });

    assert_index_size(&engine, &root, &index, 0);
}

#[test]
fn delete_of_absent_entries_is_ignored() {
    let engine = engine();
    let root = test_root();
    let doc2 = example_doc_2();
    let index = Index::new("byName", vec![FieldIndexer::new(name_path())]);

    with_write(&engine, |tx| {
        index.delete(tx, &root, &reference_for(&doc2), &expand(&doc2)).expect("delete");
    });

    assert_index_size(&engine, &root, &index, 0);
}

#[test]
fn delete_leaves_other_documents_indexed() {
    let engine = engine();
    let root = test_root();
    let doc = example_doc();
    let doc2 = example_doc_2();
    let index = Index::new(
        "byNameAndChild",
        vec![FieldIndexer::new(name_path()), FieldIndexer::new(child_name_path())],
    );

    with_write(&engine, |tx| {
        index.add(tx, &root, &reference_for(&doc), &expand(&doc)).expect("add");
        index.add(tx, &root, &reference_for(&doc2), &expand(&doc2)).expect("add");
        index.delete(tx, &root, &reference_for(&doc), &expand(&doc)).expect("delete");
    });

    let key = pack_key(&[b"John Doe".as_slice(), b""]);
    assert_indexed(&engine, &root, &index, &key, &reference_for(&doc2));
    assert_index_size(&engine, &root, &index, 1);
}

// ============================================================================
// Match scoring
// ============================================================================

#[test]
fn is_match_scores_leading_coverage() {
    let index = Index::new(
        "byNameAndUrl",
        vec![FieldIndexer::new(name_path()), FieldIndexer::new(url_path())],
    );

    let full = Query::new(QueryPart::eq(name_path(), "Jane Doe"))
        .and(QueryPart::eq(url_path(), "http://www.janedoe.com"));
    assert_eq!(index.is_match(&full), 1.0);

    // order within the query does not matter
    let reversed = Query::new(QueryPart::eq(url_path(), "http://www.janedoe.com"))
        .and(QueryPart::eq(name_path(), "Jane Doe"));
    assert_eq!(index.is_match(&reversed), 1.0);

    let partial = Query::new(QueryPart::eq(name_path(), "Jane Doe"));
    assert_eq!(index.is_match(&partial), 0.5);

    let unknown = Query::new(QueryPart::eq(
        TermPath::new(["http://schema.org/weight"]),
        "Jane Doe",
    ));
    assert_eq!(index.is_match(&unknown), 0.0);

    // the second part alone cannot drive the index
    let secondary = Query::new(QueryPart::eq(url_path(), "http://www.janedoe.com"));
    assert_eq!(index.is_match(&secondary), 0.0);
}

// ============================================================================
// Sort
// ============================================================================

#[test]
fn sort_orders_parts_by_index_position() {
    let index = Index::new(
        "byNameAndChild",
        vec![FieldIndexer::new(name_path()), FieldIndexer::new(child_name_path())],
    );
    let value = termdb::Scalar::from("value");

    let reversed = Query::new(QueryPart::eq(child_name_path(), value.clone()))
        .and(QueryPart::eq(name_path(), value.clone()));
    let sorted = index.sort(&reversed, false);
    assert_eq!(sorted.len(), 2);
    assert_eq!(sorted[0].term_path(), &name_path());
    assert_eq!(sorted[1].term_path(), &child_name_path());

    let in_order = Query::new(QueryPart::eq(name_path(), value.clone()))
        .and(QueryPart::eq(child_name_path(), value.clone()));
    let sorted = index.sort(&in_order, false);
    assert_eq!(sorted.len(), 2);
    assert_eq!(sorted[0].term_path(), &name_path());
    assert_eq!(sorted[1].term_path(), &child_name_path());
}

#[test]
fn sort_is_empty_when_primary_part_is_missing() {
    let index = Index::new(
        "byNameAndChild",
        vec![FieldIndexer::new(name_path()), FieldIndexer::new(child_name_path())],
    );
    let query = Query::new(QueryPart::eq(child_name_path(), "value"));

    assert!(index.sort(&query, false).is_empty());
}

#[test]
fn sort_appends_missing_parts_when_requested() {
    let index = Index::new(
        "byNameAndChild",
        vec![FieldIndexer::new(name_path()), FieldIndexer::new(child_name_path())],
    );
    let value = termdb::Scalar::from("value");

    let query = Query::new(QueryPart::eq(url_path(), value.clone()))
        .and(QueryPart::eq(child_name_path(), value.clone()));
    let sorted = index.sort(&query, true);
    assert_eq!(sorted.len(), 2);
    assert_eq!(sorted[0].term_path(), &child_name_path());
    assert_eq!(sorted[1].term_path(), &url_path());

    let query = Query::new(QueryPart::eq(url_path(), value.clone()))
        .and(QueryPart::eq(name_path(), value.clone()));
    let sorted = index.sort(&query, true);
    assert_eq!(sorted.len(), 2);
    assert_eq!(sorted[0].term_path(), &name_path());
    assert_eq!(sorted[1].term_path(), &url_path());
}

// ============================================================================
// Residual parts
// ============================================================================

#[test]
fn query_parts_outside_index() {
    let index = Index::new(
        "byNameAndChild",
        vec![FieldIndexer::new(name_path()), FieldIndexer::new(child_name_path())],
    );
    let value = termdb::Scalar::from("value");

    let covered = Query::new(QueryPart::eq(child_name_path(), value.clone()))
        .and(QueryPart::eq(name_path(), value.clone()));
    assert!(index.query_parts_outside_index(&covered).is_empty());

    let uncovered = Query::new(QueryPart::eq(url_path(), value.clone()));
    assert_eq!(index.query_parts_outside_index(&uncovered).len(), 1);

    let mixed = Query::new(QueryPart::eq(url_path(), value.clone()))
        .and(QueryPart::eq(name_path(), value.clone()));
    let outside = index.query_parts_outside_index(&mixed);
    assert_eq!(outside.len(), 1);
    assert_eq!(outside[0].term_path(), &url_path());
}

// ============================================================================
// Iterate
// ============================================================================

fn populated_compound_index(engine: &RedbEngine) -> Index {
    let root = test_root();
    let doc = example_doc();
    let doc2 = example_doc_2();
    let index = Index::new(
        "byNameUrlChild",
        vec![
            FieldIndexer::new(name_path())
                .with_tokenizer(whitespace_tokenizer)
                .with_transform(to_lower),
            FieldIndexer::new(url_path()),
            FieldIndexer::new(child_name_path()),
        ],
    );

    with_write(engine, |tx| {
        index.add(tx, &root, &reference_for(&doc), &expand(&doc)).expect("add");
        index.add(tx, &root, &reference_for(&doc2), &expand(&doc2)).expect("add");
    });

    index
}

fn count_matches(engine: &RedbEngine, index: &Index, query: &Query) -> usize {
    let tx = engine.begin_read().expect("begin read");
    let mut count = 0;
    index
        .iterate(&tx, &test_root(), query, |_reference, _key| {
            count += 1;
            Ok(())
        })
        .expect("iterate");
    count
}

#[test]
fn iterate_finds_nothing_for_unknown_value() {
    let engine = engine();
    let index = populated_compound_index(&engine);

    let query = Query::new(QueryPart::eq(name_path(), "not_found"));
    assert_eq!(count_matches(&engine, &index, &query), 0);
}

#[test]
fn iterate_exact_match_over_all_parts() {
    let engine = engine();
    let index = populated_compound_index(&engine);

    let query = Query::new(QueryPart::eq(name_path(), "Jane"))
        .and(QueryPart::eq(url_path(), "http://www.janedoe.com"))
        .and(QueryPart::eq(child_name_path(), "John Doe"));
    assert_eq!(count_matches(&engine, &index, &query), 1);
}

#[test]
fn iterate_matches_through_the_transform() {
    let engine = engine();
    let index = populated_compound_index(&engine);

    let query = Query::new(QueryPart::eq(name_path(), "JANE"))
        .and(QueryPart::eq(url_path(), "http://www.janedoe.com"))
        .and(QueryPart::eq(child_name_path(), "John Doe"));
    assert_eq!(count_matches(&engine, &index, &query), 1);
}

#[test]
fn iterate_with_leading_part_only() {
    let engine = engine();
    let index = populated_compound_index(&engine);

    let query = Query::new(QueryPart::eq(name_path(), "Jane"));
    assert_eq!(count_matches(&engine, &index, &query), 1);
}

#[test]
fn iterate_with_trailing_parts_unconstrained_and_empty() {
    let engine = engine();
    let root = test_root();
    let doc = example_doc();
    let doc2 = example_doc_2();
    let index = Index::new(
        "byNameUnknowns",
        vec![
            FieldIndexer::new(name_path())
                .with_tokenizer(whitespace_tokenizer)
                .with_transform(to_lower),
            FieldIndexer::new(TermPath::new(["http://schema.org/unknown"])),
            FieldIndexer::new(TermPath::new(["http://schema.org/unknown2"])),
        ],
    );

    with_write(&engine, |tx| {
        index.add(tx, &root, &reference_for(&doc), &expand(&doc)).expect("add");
        index.add(tx, &root, &reference_for(&doc2), &expand(&doc2)).expect("add");
    });

    let query = Query::new(QueryPart::eq(name_path(), "Jane"));
    assert_eq!(count_matches(&engine, &index, &query), 1);
}

#[test]
fn iterate_rejects_query_outside_the_index() {
    let engine = engine();
    let index = populated_compound_index(&engine);

    let query = Query::new(QueryPart::eq(
        TermPath::new(["http://schema.org/unknown"]),
        "Jane Doe",
    ));
    let tx = engine.begin_read().expect("begin read");
    let result = index.iterate(&tx, &test_root(), &query, |_r, _k| Ok(()));

    assert!(matches!(result, Err(Error::NoQuery)));
}

#[test]
fn iterate_range_over_leading_part() {
    let engine = engine();
    let root = test_root();
    let doc = example_doc();
    let doc2 = example_doc_2();
    let weight = TermPath::new(["http://schema.org/weight"]);
    let index = Index::new("byWeight", vec![FieldIndexer::new(weight.clone())]);

    with_write(&engine, |tx| {
        index.add(tx, &root, &reference_for(&doc), &expand(&doc)).expect("add");
        index.add(tx, &root, &reference_for(&doc2), &expand(&doc2)).expect("add");
    });

    // doc weighs 80, doc2 weighs 90
    let hits = Query::new(QueryPart::range(weight.clone(), 70.0, 85.0));
    assert_eq!(count_matches(&engine, &index, &hits), 1);

    let all = Query::new(QueryPart::range(weight.clone(), 70.0, 95.0));
    assert_eq!(count_matches(&engine, &index, &all), 2);

    let none = Query::new(QueryPart::range(weight, 10.0, 20.0));
    assert_eq!(count_matches(&engine, &index, &none), 0);
}

#[test]
fn iterate_prefix_over_tokenized_part() {
    let engine = engine();
    let index = populated_compound_index(&engine);

    // tokens: doe, jane (doc) and doe, john (doc2); "jo" matches john only
    let query = Query::new(QueryPart::prefix(name_path(), "jo"));
    assert_eq!(count_matches(&engine, &index, &query), 1);

    // "doe" is a token of both documents
    let query = Query::new(QueryPart::eq(name_path(), "doe"));
    assert_eq!(count_matches(&engine, &index, &query), 2);
}
