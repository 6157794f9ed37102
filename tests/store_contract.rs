//! Store contract properties over the local backend
//!
//! Each test opens a fresh table in a temp directory, seeded with the
//! bundled catalogue.

use mirrordb::cursor::SortDirection;
use mirrordb::document::Document;
use mirrordb::filter::OperatorPolicy;
use mirrordb::storage::default_seed;
use mirrordb::store::{DocumentStore, LocalStore};
use serde_json::{json, Value};
use tempfile::TempDir;

fn open_seeded(temp_dir: &TempDir) -> LocalStore {
    let seed = default_seed().unwrap();
    LocalStore::open(temp_dir.path(), &seed, OperatorPolicy::Ignore).unwrap()
}

fn doc(value: Value) -> Document {
    value.as_object().unwrap().clone()
}

fn ids(docs: &[Document]) -> Vec<String> {
    docs.iter()
        .map(|d| d["record_id"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_empty_filter_counts_every_record() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_seeded(&temp_dir);

    assert_eq!(store.count(&json!({})).unwrap(), 40);
    assert_eq!(store.count(&Value::Null).unwrap(), 40);
    assert_eq!(store.table().len().unwrap(), 40);
}

#[test]
fn test_find_agrees_with_count() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_seeded(&temp_dir);

    for filter in [
        json!({"channel": "ANI News India"}),
        json!({"view_count": {"$gte": 500000}}),
        json!({"$text": {"$search": "market"}}),
        json!({"channel": {"$regex": "^bloom", "$options": "i"}, "like_count": {"$lt": 10000}}),
    ] {
        let found = store.find(&filter).unwrap().fetch().unwrap();
        assert_eq!(found.len(), store.count(&filter).unwrap(), "filter {}", filter);
    }
}

#[test]
fn test_regex_case_insensitive_flag() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_seeded(&temp_dir);

    let sensitive = store.count(&json!({"channel": {"$regex": "bloomberg"}})).unwrap();
    let insensitive = store
        .count(&json!({"channel": {"$regex": "bloomberg", "$options": "i"}}))
        .unwrap();

    assert_eq!(sensitive, 0);
    assert_eq!(insensitive, 20);
}

#[test]
fn test_range_bounds_are_inclusive_or_strict() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_seeded(&temp_dir);
    store
        .upsert(doc(json!({"record_id": "edge", "view_count": 777})))
        .unwrap();

    let at = |filter: Value| {
        let found = store.find(&filter).unwrap().fetch().unwrap();
        ids(&found).contains(&"edge".to_string())
    };

    assert!(at(json!({"view_count": {"$gte": 777}})));
    assert!(at(json!({"view_count": {"$lte": 777}})));
    assert!(!at(json!({"view_count": {"$gt": 777}})));
    assert!(!at(json!({"view_count": {"$lt": 777}})));
}

#[test]
fn test_cursor_is_sort_then_skip_then_limit() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_seeded(&temp_dir);

    let all = store
        .find(&json!({}))
        .unwrap()
        .sort("view_count", SortDirection::Desc)
        .fetch()
        .unwrap();

    // Builder call order does not matter
    let window = store
        .find(&json!({}))
        .unwrap()
        .limit(5)
        .skip(3)
        .sort("view_count", SortDirection::Desc)
        .fetch()
        .unwrap();

    assert_eq!(ids(&window), ids(&all[3..8]));
}

#[test]
fn test_upsert_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_seeded(&temp_dir);
    let record = doc(json!({"record_id": "new1", "channel": "Fresh", "view_count": 3}));

    assert!(store.upsert(record.clone()).unwrap());
    assert!(!store.upsert(record).unwrap());
    assert_eq!(store.count(&json!({})).unwrap(), 41);
    assert_eq!(store.count(&json!({"record_id": "new1"})).unwrap(), 1);
}

#[test]
fn test_upsert_replaces_whole_document() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_seeded(&temp_dir);

    store
        .upsert(doc(json!({"record_id": "bm001", "channel": "Renamed"})))
        .unwrap();

    let replaced = store
        .find_one(&json!({"record_id": "bm001"}), None)
        .unwrap()
        .unwrap();
    assert_eq!(replaced["channel"], json!("Renamed"));
    assert!(replaced.get("view_count").is_none());
    assert_eq!(store.count(&json!({})).unwrap(), 40);
}

#[test]
fn test_distinct_is_a_set() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_seeded(&temp_dir);

    let channels = store.distinct("channel").unwrap();
    assert_eq!(channels.len(), 2);
    assert!(channels.contains(&json!("Bloomberg Markets")));
    assert!(channels.contains(&json!("ANI News India")));
    assert!(store.distinct("no_such_field").unwrap().is_empty());
}

#[test]
fn test_writes_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    {
        let store = open_seeded(&temp_dir);
        store
            .upsert(doc(json!({"record_id": "kept", "channel": "Z"})))
            .unwrap();
    }

    // Reopening with a seed does not reseed a non-empty table
    let store = open_seeded(&temp_dir);
    assert_eq!(store.count(&json!({})).unwrap(), 41);
    assert_eq!(store.count(&json!({"channel": "Z"})).unwrap(), 1);
}

#[test]
fn test_unsupported_operator_policy() {
    let temp_dir = TempDir::new().unwrap();
    let lenient = open_seeded(&temp_dir);
    assert_eq!(
        lenient.count(&json!({"channel": {"$in": ["x"]}})).unwrap(),
        40
    );

    let strict_dir = TempDir::new().unwrap();
    let seed = default_seed().unwrap();
    let strict = LocalStore::open(strict_dir.path(), &seed, OperatorPolicy::Reject).unwrap();
    let err = strict
        .count(&json!({"channel": {"$in": ["x"]}}))
        .unwrap_err();
    assert_eq!(err.code(), "MIRROR_FILTER_UNSUPPORTED_OPERATOR");
}
