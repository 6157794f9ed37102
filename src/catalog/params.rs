//! Request and response shapes for catalogue queries

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::Document;

pub const DEFAULT_SEARCH_LIMIT: usize = 50;
pub const DEFAULT_RECENT_LIMIT: usize = 10;
pub const DEFAULT_TOP_LIMIT: usize = 20;
pub const DEFAULT_TRENDING_DAYS: i64 = 7;

/// Search options; every filter is optional and they combine with AND
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    /// Substring over title and description
    pub text: Option<String>,
    /// Case-insensitive pattern over the channel name
    pub channel: Option<String>,
    pub min_views: Option<i64>,
    pub max_views: Option<i64>,
    /// Inclusive ISO-8601 bounds on `upload_date`
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            text: None,
            channel: None,
            min_views: None,
            max_views: None,
            date_from: None,
            date_to: None,
            limit: DEFAULT_SEARCH_LIMIT,
            offset: 0,
        }
    }
}

impl SearchParams {
    /// Builds the dialect filter for these options.
    pub fn to_filter(&self) -> Value {
        let mut filter = Map::new();

        if let Some(text) = self.text.as_deref().filter(|t| !t.is_empty()) {
            filter.insert("$text".into(), serde_json::json!({"$search": text}));
        }
        if let Some(channel) = self.channel.as_deref().filter(|c| !c.is_empty()) {
            filter.insert("channel".into(), channel_pattern(channel));
        }

        let mut views = Map::new();
        if let Some(min) = self.min_views {
            views.insert("$gte".into(), Value::from(min));
        }
        if let Some(max) = self.max_views {
            views.insert("$lte".into(), Value::from(max));
        }
        if !views.is_empty() {
            filter.insert("view_count".into(), Value::Object(views));
        }

        let mut dates = Map::new();
        if let Some(from) = self.date_from.as_deref().filter(|d| !d.is_empty()) {
            dates.insert("$gte".into(), Value::from(from));
        }
        if let Some(to) = self.date_to.as_deref().filter(|d| !d.is_empty()) {
            dates.insert("$lte".into(), Value::from(to));
        }
        if !dates.is_empty() {
            filter.insert("upload_date".into(), Value::Object(dates));
        }

        Value::Object(filter)
    }
}

/// `{"$regex": channel, "$options": "i"}`
pub(crate) fn channel_pattern(channel: &str) -> Value {
    serde_json::json!({"$regex": channel, "$options": "i"})
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPage {
    /// Matches for the filter before offset/limit
    pub total: usize,
    pub results: Vec<Document>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseSummary {
    pub total_videos: usize,
    pub total_channels: usize,
}

/// Collection-wide statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStatistics {
    pub database: DatabaseSummary,
    /// One row per channel, highest average views first
    pub channels: Vec<Document>,
    /// Totals across every record; empty when there are none
    pub overall: Document,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_params_match_everything() {
        assert_eq!(SearchParams::default().to_filter(), json!({}));
    }

    #[test]
    fn test_full_params() {
        let params: SearchParams = serde_json::from_value(json!({
            "text": "rates",
            "channel": "bloomberg",
            "min_views": 100,
            "date_from": "2026-02-01",
            "date_to": "2026-02-28",
            "limit": 5
        }))
        .unwrap();

        assert_eq!(params.limit, 5);
        assert_eq!(params.offset, 0);
        assert_eq!(
            params.to_filter(),
            json!({
                "$text": {"$search": "rates"},
                "channel": {"$regex": "bloomberg", "$options": "i"},
                "view_count": {"$gte": 100},
                "upload_date": {"$gte": "2026-02-01", "$lte": "2026-02-28"}
            })
        );
    }

    #[test]
    fn test_blank_strings_are_ignored() {
        let params = SearchParams {
            text: Some(String::new()),
            channel: Some(String::new()),
            ..SearchParams::default()
        };
        assert_eq!(params.to_filter(), json!({}));
    }
}
