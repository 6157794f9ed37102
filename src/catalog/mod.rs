//! Video catalogue queries used by the API and chat layers
//!
//! Every query goes through [`DocumentStore`](crate::store::DocumentStore),
//! so results come from whichever backend the selector chose.

mod params;
mod queries;

pub use params::{
    CatalogStatistics, DatabaseSummary, SearchPage, SearchParams, DEFAULT_RECENT_LIMIT,
    DEFAULT_SEARCH_LIMIT, DEFAULT_TOP_LIMIT, DEFAULT_TRENDING_DAYS,
};
pub use queries::Catalog;
