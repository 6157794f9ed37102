//! Typed view of the persisted video record.
//!
//! Scrapers and webhook payloads arrive with loosely-typed metadata;
//! `VideoRecord::from_raw` normalizes them into the stored schema.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Document;

/// Descriptions longer than this are truncated on ingest
pub const DESCRIPTION_MAX_CHARS: usize = 2000;

/// A video record as stored by every backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub record_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub channel_url: String,
    /// ISO-8601 timestamp string
    #[serde(default)]
    pub upload_date: String,
    #[serde(default)]
    pub view_count: i64,
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub comment_count: i64,
    /// Seconds
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingested_at: Option<String>,
    /// Provenance tag (`seed`, `yt-dlp`, `webhook`, ...)
    #[serde(default)]
    pub source: String,
}

fn str_field<'a>(raw: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    raw.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn int_field(raw: &Map<String, Value>, key: &str) -> i64 {
    match raw.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// `20260226` becomes `2026-02-26T00:00:00Z`; anything else is kept verbatim.
fn normalize_upload_date(raw: &str) -> String {
    if raw.len() == 8 {
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y%m%d") {
            return format!("{}T00:00:00Z", date.format("%Y-%m-%d"));
        }
    }
    raw.to_string()
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

impl VideoRecord {
    /// Normalizes scraped metadata into a record.
    ///
    /// Returns `None` when no identifier can be found.
    pub fn from_raw(raw: &Map<String, Value>) -> Option<Self> {
        let record_id = str_field(raw, "record_id")
            .or_else(|| str_field(raw, "video_id"))
            .or_else(|| str_field(raw, "id"))?
            .to_string();

        let url = str_field(raw, "url")
            .map(str::to_string)
            .unwrap_or_else(|| format!("https://www.youtube.com/watch?v={}", record_id));

        let tags = raw
            .get("tags")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            title: str_field(raw, "title").unwrap_or_default().to_string(),
            channel: str_field(raw, "channel")
                .or_else(|| str_field(raw, "uploader"))
                .unwrap_or_default()
                .to_string(),
            channel_id: str_field(raw, "channel_id").unwrap_or_default().to_string(),
            channel_url: str_field(raw, "channel_url")
                .or_else(|| str_field(raw, "uploader_url"))
                .unwrap_or_default()
                .to_string(),
            upload_date: normalize_upload_date(str_field(raw, "upload_date").unwrap_or_default()),
            view_count: int_field(raw, "view_count"),
            like_count: int_field(raw, "like_count"),
            comment_count: int_field(raw, "comment_count"),
            duration: int_field(raw, "duration"),
            description: truncate_chars(
                str_field(raw, "description").unwrap_or_default(),
                DESCRIPTION_MAX_CHARS,
            ),
            thumbnail: str_field(raw, "thumbnail").unwrap_or_default().to_string(),
            tags,
            ingested_at: Some(Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()),
            source: str_field(raw, "_source")
                .or_else(|| str_field(raw, "source"))
                .unwrap_or("yt-dlp")
                .to_string(),
            url,
            record_id,
        })
    }

    /// Reads a stored document back into the typed form.
    pub fn from_document(doc: &Document) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(doc.clone()))
    }

    /// Converts into the document handed to `upsert`.
    pub fn into_document(self) -> Document {
        let mut doc = Document::new();
        doc.insert("record_id".into(), Value::from(self.record_id));
        doc.insert("title".into(), Value::from(self.title));
        doc.insert("url".into(), Value::from(self.url));
        doc.insert("upload_date".into(), Value::from(self.upload_date));
        doc.insert("view_count".into(), Value::from(self.view_count));
        doc.insert("like_count".into(), Value::from(self.like_count));
        doc.insert("description".into(), Value::from(self.description));
        doc.insert("channel_id".into(), Value::from(self.channel_id));
        doc.insert("channel".into(), Value::from(self.channel));
        doc.insert("channel_url".into(), Value::from(self.channel_url));
        doc.insert("duration".into(), Value::from(self.duration));
        doc.insert("thumbnail".into(), Value::from(self.thumbnail));
        doc.insert(
            "tags".into(),
            Value::Array(self.tags.into_iter().map(Value::from).collect()),
        );
        doc.insert("comment_count".into(), Value::from(self.comment_count));
        if let Some(ingested_at) = self.ingested_at {
            doc.insert("ingested_at".into(), Value::from(ingested_at));
        }
        doc.insert("source".into(), Value::from(self.source));
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_compact_upload_date_becomes_iso() {
        let record = VideoRecord::from_raw(&raw(json!({
            "id": "abc123",
            "upload_date": "20260226",
        })))
        .unwrap();

        assert_eq!(record.record_id, "abc123");
        assert_eq!(record.upload_date, "2026-02-26T00:00:00Z");
        assert_eq!(record.url, "https://www.youtube.com/watch?v=abc123");
        assert_eq!(record.source, "yt-dlp");
    }

    #[test]
    fn test_unparseable_date_kept() {
        let record = VideoRecord::from_raw(&raw(json!({
            "video_id": "v1",
            "upload_date": "2026-02-26T14:30:00Z",
        })))
        .unwrap();
        assert_eq!(record.upload_date, "2026-02-26T14:30:00Z");

        let record = VideoRecord::from_raw(&raw(json!({
            "video_id": "v1",
            "upload_date": "2026ab26",
        })))
        .unwrap();
        assert_eq!(record.upload_date, "2026ab26");
    }

    #[test]
    fn test_counts_coerced() {
        let record = VideoRecord::from_raw(&raw(json!({
            "id": "v2",
            "view_count": null,
            "like_count": "17",
            "comment_count": 3.0,
        })))
        .unwrap();
        assert_eq!(record.view_count, 0);
        assert_eq!(record.like_count, 17);
        assert_eq!(record.comment_count, 3);
    }

    #[test]
    fn test_description_truncated() {
        let long = "é".repeat(DESCRIPTION_MAX_CHARS + 50);
        let record = VideoRecord::from_raw(&raw(json!({"id": "v3", "description": long}))).unwrap();
        assert_eq!(record.description.chars().count(), DESCRIPTION_MAX_CHARS);
    }

    #[test]
    fn test_uploader_fallback_and_source_tag() {
        let record = VideoRecord::from_raw(&raw(json!({
            "id": "v4",
            "uploader": "ANI News India",
            "_source": "webhook",
        })))
        .unwrap();
        assert_eq!(record.channel, "ANI News India");
        assert_eq!(record.source, "webhook");
    }

    #[test]
    fn test_missing_identifier() {
        assert!(VideoRecord::from_raw(&raw(json!({"title": "no id"}))).is_none());
    }

    #[test]
    fn test_document_round_trip_keeps_record_id_first() {
        let record = VideoRecord::from_raw(&raw(json!({"id": "v5", "tags": ["a", 1, "b"]}))).unwrap();
        let doc = record.clone().into_document();

        assert_eq!(doc.keys().next().map(String::as_str), Some("record_id"));
        assert_eq!(doc["tags"], json!(["a", "b"]));
        assert_eq!(VideoRecord::from_document(&doc).unwrap(), record);
    }
}
