//! Index requests
//!
//! Backends with real indexes build them; the local store accepts and
//! ignores them.

use std::fmt;

/// Key kind of one indexed field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Ascending,
    Descending,
    Text,
}

impl IndexKind {
    fn suffix(&self) -> &'static str {
        match self {
            IndexKind::Ascending => "1",
            IndexKind::Descending => "-1",
            IndexKind::Text => "text",
        }
    }
}

/// An index creation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub keys: Vec<(String, IndexKind)>,
    pub unique: bool,
}

impl IndexSpec {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self::single(field, IndexKind::Ascending)
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self::single(field, IndexKind::Descending)
    }

    /// Text index over several fields
    pub fn text<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: fields
                .into_iter()
                .map(|field| (field.into(), IndexKind::Text))
                .collect(),
            unique: false,
        }
    }

    fn single(field: impl Into<String>, kind: IndexKind) -> Self {
        Self {
            keys: vec![(field.into(), kind)],
            unique: false,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Conventional index name, e.g. `upload_date_-1`
    pub fn name(&self) -> String {
        self.keys
            .iter()
            .map(|(field, kind)| format!("{}_{}", field, kind.suffix()))
            .collect::<Vec<_>>()
            .join("_")
    }
}

impl fmt::Display for IndexSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        if self.unique {
            write!(f, " (unique)")?;
        }
        Ok(())
    }
}

/// Indexes the catalogue queries rely on
pub fn standard_indexes() -> Vec<IndexSpec> {
    vec![
        IndexSpec::ascending("record_id").unique(),
        IndexSpec::descending("upload_date"),
        IndexSpec::ascending("channel_id"),
        IndexSpec::text(["title", "description"]),
    ]
}
