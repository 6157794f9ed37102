//! Catalogue queries over any store backend

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::{json, Map, Value};

use super::params::{
    channel_pattern, CatalogStatistics, DatabaseSummary, SearchPage, SearchParams,
};
use crate::cursor::{SortDirection, SortSpec};
use crate::document::{Document, VideoRecord};
use crate::store::{DocumentStore, StoreError, StoreResult};

const UPLOAD_DATE: &str = "upload_date";

/// Video-catalogue queries issued through the store contract only
#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn DocumentStore>,
}

impl Catalog {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Filtered page, newest first, with the total match count
    pub fn search(&self, params: &SearchParams) -> StoreResult<SearchPage> {
        let filter = params.to_filter();
        let total = self.store.count(&filter)?;
        let results = self
            .store
            .find(&filter)?
            .sort(UPLOAD_DATE, SortDirection::Desc)
            .skip(params.offset)
            .limit(params.limit)
            .fetch()?;
        Ok(SearchPage { total, results })
    }

    /// Newest uploads, optionally for one channel
    pub fn recent(&self, limit: usize, channel: Option<&str>) -> StoreResult<Vec<Document>> {
        let filter = channel_filter(channel);
        self.store
            .find(&filter)?
            .sort(UPLOAD_DATE, SortDirection::Desc)
            .limit(limit)
            .fetch()
    }

    /// Highest `sort_by` values first
    pub fn top(&self, sort_by: &str, limit: usize) -> StoreResult<Vec<Document>> {
        self.store
            .find(&json!({}))?
            .sort(sort_by, SortDirection::Desc)
            .limit(limit)
            .fetch()
    }

    /// Uploads with `from <= upload_date <= to`, newest first
    pub fn by_date_range(
        &self,
        from: &str,
        to: &str,
        limit: usize,
        channel: Option<&str>,
    ) -> StoreResult<Vec<Document>> {
        let mut filter = Map::new();
        filter.insert(UPLOAD_DATE.into(), json!({"$gte": from, "$lte": to}));
        if let Some(channel) = channel.filter(|c| !c.is_empty()) {
            filter.insert("channel".into(), channel_pattern(channel));
        }

        self.store
            .find(&Value::Object(filter))?
            .sort(UPLOAD_DATE, SortDirection::Desc)
            .limit(limit)
            .fetch()
    }

    pub fn last_24h(&self, channel: Option<&str>) -> StoreResult<Vec<Document>> {
        self.last_24h_at(Utc::now(), channel)
    }

    pub fn last_24h_at(
        &self,
        now: DateTime<Utc>,
        channel: Option<&str>,
    ) -> StoreResult<Vec<Document>> {
        let from = iso(now - Duration::hours(24));
        self.by_date_range(&from, &iso(now), 50, channel)
    }

    pub fn trending(&self, days: i64, limit: usize) -> StoreResult<Vec<Document>> {
        self.trending_at(Utc::now(), days, limit)
    }

    /// Uploads from the last `days` days, most viewed first.
    ///
    /// Requests views, then likes, then comments; cursors honor only the
    /// first key.
    pub fn trending_at(
        &self,
        now: DateTime<Utc>,
        days: i64,
        limit: usize,
    ) -> StoreResult<Vec<Document>> {
        let cutoff = iso(now - Duration::days(days));
        self.store
            .find(&json!({"upload_date": {"$gte": cutoff}}))?
            .sort_pairs(&[
                ("view_count".to_string(), SortDirection::Desc),
                ("like_count".to_string(), SortDirection::Desc),
                ("comment_count".to_string(), SortDirection::Desc),
            ])
            .limit(limit)
            .fetch()
    }

    /// Records whose channel matches `channel`, case-insensitively
    pub fn count_by_channel(&self, channel: &str) -> StoreResult<usize> {
        self.store.count(&channel_filter(Some(channel)))
    }

    /// Exact per-channel record counts
    pub fn channel_counts(&self) -> StoreResult<BTreeMap<String, usize>> {
        let mut counts = BTreeMap::new();
        for channel in self.store.distinct("channel")? {
            let count = self.store.count(&json!({"channel": channel.clone()}))?;
            let name = match channel {
                Value::String(name) => name,
                other => other.to_string(),
            };
            counts.insert(name, count);
        }
        Ok(counts)
    }

    pub fn statistics(&self) -> StoreResult<CatalogStatistics> {
        let total_videos = self.store.count(&json!({}))?;
        let total_channels = self.store.distinct("channel")?.len();

        let channels = self.store.aggregate(&[
            json!({"$group": {
                "_id": "$channel",
                "video_count": {"$sum": 1},
                "total_views": {"$sum": "$view_count"},
                "avg_views": {"$avg": "$view_count"},
                "total_likes": {"$sum": "$like_count"},
                "avg_likes": {"$avg": "$like_count"},
                "latest_video": {"$max": "$upload_date"}
            }}),
            json!({"$project": {
                "channel": "$_id",
                "video_count": 1,
                "total_views": 1,
                "avg_views": {"$round": ["$avg_views", 2]},
                "total_likes": 1,
                "avg_likes": {"$round": ["$avg_likes", 2]},
                "latest_video": 1,
                "_id": 0
            }}),
            json!({"$sort": {"avg_views": -1}}),
        ])?;

        let overall = self
            .store
            .aggregate(&[
                json!({"$group": {
                    "_id": null,
                    "total_views": {"$sum": "$view_count"},
                    "total_likes": {"$sum": "$like_count"},
                    "avg_duration": {"$avg": "$duration"},
                    "earliest_video": {"$min": "$upload_date"},
                    "latest_video": {"$max": "$upload_date"}
                }}),
                json!({"$project": {
                    "total_views": 1,
                    "total_likes": 1,
                    "avg_duration": {"$round": ["$avg_duration", 2]},
                    "earliest_video": 1,
                    "latest_video": 1,
                    "_id": 0
                }}),
            ])?
            .into_iter()
            .next()
            .unwrap_or_default();

        Ok(CatalogStatistics {
            database: DatabaseSummary {
                total_videos,
                total_channels,
            },
            channels,
            overall,
        })
    }

    /// Normalizes scraped metadata and upserts it.
    pub fn ingest(&self, raw: &Map<String, Value>) -> StoreResult<bool> {
        let record = VideoRecord::from_raw(raw).ok_or(StoreError::MissingRecordId)?;
        self.store.upsert(record.into_document())
    }

    /// Newest record by upload date, if any
    pub fn latest(&self) -> StoreResult<Option<Document>> {
        self.store
            .find_one(&json!({}), Some(&SortSpec::desc(UPLOAD_DATE)))
    }
}

fn channel_filter(channel: Option<&str>) -> Value {
    let mut filter = Map::new();
    if let Some(channel) = channel.filter(|c| !c.is_empty()) {
        filter.insert("channel".into(), channel_pattern(channel));
    }
    Value::Object(filter)
}

/// Timestamp in the stored `upload_date` format
fn iso(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
