//! Catalogue queries over the bundled seed

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use mirrordb::catalog::{Catalog, SearchParams};
use mirrordb::document::Document;
use mirrordb::filter::OperatorPolicy;
use mirrordb::storage::default_seed;
use mirrordb::store::LocalStore;
use serde_json::json;
use tempfile::TempDir;

fn seeded_catalog(temp_dir: &TempDir) -> Catalog {
    let seed = default_seed().unwrap();
    let store = LocalStore::open(temp_dir.path(), &seed, OperatorPolicy::Ignore).unwrap();
    Catalog::new(Arc::new(store))
}

fn is_sorted_desc(docs: &[Document], field: &str) -> bool {
    docs.windows(2).all(|pair| {
        let a = pair[0][field].as_str().unwrap();
        let b = pair[1][field].as_str().unwrap();
        a >= b
    })
}

#[test]
fn test_recent_is_newest_first() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = seeded_catalog(&temp_dir);

    let recent = catalog.recent(10, None).unwrap();
    assert_eq!(recent.len(), 10);
    assert!(is_sorted_desc(&recent, "upload_date"));
    assert_eq!(recent[0]["upload_date"], json!("2026-02-26T16:00:00Z"));

    let latest = catalog.latest().unwrap().unwrap();
    assert_eq!(latest["record_id"], recent[0]["record_id"]);
}

#[test]
fn test_channel_lookup_ignores_case() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = seeded_catalog(&temp_dir);

    assert_eq!(catalog.count_by_channel("bloomberg markets").unwrap(), 20);
    let recent = catalog.recent(50, Some("ani news")).unwrap();
    assert_eq!(recent.len(), 20);

    let counts = catalog.channel_counts().unwrap();
    assert_eq!(counts.get("Bloomberg Markets"), Some(&20));
    assert_eq!(counts.get("ANI News India"), Some(&20));
}

#[test]
fn test_search_total_ignores_window() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = seeded_catalog(&temp_dir);

    let params = SearchParams {
        channel: Some("Bloomberg".to_string()),
        limit: 5,
        offset: 2,
        ..SearchParams::default()
    };
    let page = catalog.search(&params).unwrap();

    assert_eq!(page.total, 20);
    assert_eq!(page.results.len(), 5);
    assert!(is_sorted_desc(&page.results, "upload_date"));
}

#[test]
fn test_last_24h_window() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = seeded_catalog(&temp_dir);
    let now = Utc.with_ymd_and_hms(2026, 2, 27, 0, 0, 0).unwrap();

    let day = catalog.last_24h_at(now, None).unwrap();
    assert!(!day.is_empty());
    assert!(day
        .iter()
        .all(|d| d["upload_date"].as_str().unwrap() >= "2026-02-26T00:00:00Z"));
}

#[test]
fn test_statistics_cover_every_channel() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = seeded_catalog(&temp_dir);

    let stats = catalog.statistics().unwrap();
    assert_eq!(stats.database.total_videos, 40);
    assert_eq!(stats.database.total_channels, 2);
    assert_eq!(stats.channels.len(), 2);

    let videos: i64 = stats
        .channels
        .iter()
        .map(|c| c["video_count"].as_i64().unwrap())
        .sum();
    assert_eq!(videos, 40);
    assert_eq!(
        stats.overall["latest_video"],
        json!("2026-02-26T16:00:00Z")
    );
}

#[test]
fn test_ingest_normalizes_and_upserts() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = seeded_catalog(&temp_dir);

    let raw = json!({
        "video_id": "fresh01",
        "title": "Fresh upload",
        "uploader": "New Channel",
        "upload_date": "20260301",
        "view_count": 10
    });
    assert!(catalog.ingest(raw.as_object().unwrap()).unwrap());
    assert!(!catalog.ingest(raw.as_object().unwrap()).unwrap());

    let latest = catalog.latest().unwrap().unwrap();
    assert_eq!(latest["record_id"], json!("fresh01"));
    assert_eq!(latest["upload_date"], json!("2026-03-01T00:00:00Z"));

    let missing = json!({"title": "no id"});
    let err = catalog.ingest(missing.as_object().unwrap()).unwrap_err();
    assert_eq!(err.code(), "MIRROR_STORE_MISSING_RECORD_ID");
}
