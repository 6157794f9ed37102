//! Cursor
//!
//! A deferred view over a filtered document sequence. Builder calls only
//! record state; every resolution asks the source for a fresh filtered
//! sequence and applies sort, then skip, then limit.

mod sort;

pub use sort::{SortDirection, SortSpec};

use std::fmt;
use std::sync::Arc;

use crate::document::Document;
use crate::filter::Filter;
use crate::store::StoreResult;

/// Pending sort/skip/limit state of a cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursorOptions {
    pub sort: Option<SortSpec>,
    pub skip: usize,
    pub limit: Option<usize>,
}

impl CursorOptions {
    /// Applies sort, then skip, then limit.
    ///
    /// `limit(0)` yields nothing; an unset limit keeps everything.
    pub fn apply(&self, mut docs: Vec<Document>) -> Vec<Document> {
        if let Some(spec) = &self.sort {
            spec.sort(&mut docs);
        }
        if self.skip > 0 {
            let skip = self.skip.min(docs.len());
            docs.drain(..skip);
        }
        if let Some(limit) = self.limit {
            docs.truncate(limit);
        }
        docs
    }
}

/// Backend that can produce the current result of a cursor
pub trait CursorSource: Send + Sync {
    /// Reads the document set fresh, filters it and applies `options`.
    fn resolve(&self, filter: &Filter, options: &CursorOptions) -> StoreResult<Vec<Document>>;
}

/// Lazy, re-resolvable query result
#[derive(Clone)]
pub struct Cursor {
    source: Arc<dyn CursorSource>,
    filter: Filter,
    options: CursorOptions,
}

impl Cursor {
    pub fn new(source: Arc<dyn CursorSource>, filter: Filter) -> Self {
        Self {
            source,
            filter,
            options: CursorOptions::default(),
        }
    }

    /// Sorts on one field. Replaces any earlier sort.
    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.options.sort = Some(SortSpec::new(field, direction));
        self
    }

    pub fn sort_by(mut self, spec: SortSpec) -> Self {
        self.options.sort = Some(spec);
        self
    }

    /// Multi-key form; only the first pair takes effect.
    pub fn sort_pairs(mut self, pairs: &[(String, SortDirection)]) -> Self {
        if let Some(spec) = SortSpec::from_pairs(pairs) {
            self.options.sort = Some(spec);
        }
        self
    }

    pub fn skip(mut self, n: usize) -> Self {
        self.options.skip = n;
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.options.limit = Some(n);
        self
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn options(&self) -> &CursorOptions {
        &self.options
    }

    /// Resolves the cursor against the current contents of the source.
    pub fn fetch(&self) -> StoreResult<Vec<Document>> {
        self.source.resolve(&self.filter, &self.options)
    }

    /// Element `idx` of a fresh resolution, or `None` past the end.
    pub fn get(&self, idx: usize) -> StoreResult<Option<Document>> {
        Ok(self.fetch()?.into_iter().nth(idx))
    }

    pub fn first(&self) -> StoreResult<Option<Document>> {
        self.get(0)
    }

    /// Number of documents a fresh resolution yields, after skip and limit
    pub fn count(&self) -> StoreResult<usize> {
        Ok(self.fetch()?.len())
    }
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("filter", &self.filter)
            .field("options", &self.options)
            .finish()
    }
}
