//! Sort specifications
//!
//! The dialect writes directions as integers: `1` ascending, `-1` descending.
//! Any other integer sorts ascending.

use std::cmp::Ordering;

use serde_json::Value;

use crate::document::{compare_values, field_for_sort, Document};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// `-1` is descending, every other value ascending
    pub fn from_i64(direction: i64) -> Self {
        if direction == -1 {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    /// Reads a direction operand; `None` when it is not an integer
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_i64().map(Self::from_i64)
    }

    pub fn as_i64(&self) -> i64 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }

    /// Applies this direction to an ascending ordering
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Sort on a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }

    /// Takes the first pair of a multi-key specification; the rest is
    /// dropped. Returns `None` for an empty list.
    pub fn from_pairs(pairs: &[(String, SortDirection)]) -> Option<Self> {
        pairs
            .first()
            .map(|(field, direction)| Self::new(field.clone(), *direction))
    }

    /// Reads a sort specification from JSON.
    ///
    /// Accepted shapes:
    /// - `"field"` (descending, the cursor's default direction)
    /// - `["field", dir]`
    /// - `[["field", dir], ...]` (first pair only)
    /// - `{"field": dir, ...}` (first entry only)
    pub fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::String(field) => Ok(Self::desc(field.clone())),
            Value::Array(items) => match items.first() {
                Some(Value::Array(pair)) => Self::from_pair(pair),
                Some(Value::String(_)) => Self::from_pair(items),
                Some(other) => Err(format!("unexpected sort entry {}", other)),
                None => Err("sort list is empty".to_string()),
            },
            Value::Object(map) => match map.iter().next() {
                Some((field, direction)) => Ok(Self::new(
                    field.clone(),
                    SortDirection::from_value(direction)
                        .ok_or_else(|| format!("direction for {} must be an integer", field))?,
                )),
                None => Err("sort object is empty".to_string()),
            },
            other => Err(format!("unexpected sort specification {}", other)),
        }
    }

    fn from_pair(pair: &[Value]) -> Result<Self, String> {
        match pair {
            [Value::String(field)] => Ok(Self::desc(field.clone())),
            [Value::String(field), direction, ..] => Ok(Self::new(
                field.clone(),
                SortDirection::from_value(direction)
                    .ok_or_else(|| format!("direction for {} must be an integer", field))?,
            )),
            _ => Err("sort pair must be [field, direction]".to_string()),
        }
    }

    /// Compares two documents on this field. Missing and null values sort
    /// as the empty string.
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        let ordering = compare_values(
            field_for_sort(a, &self.field),
            field_for_sort(b, &self.field),
        );
        self.direction.apply(ordering)
    }

    /// Stable in-place sort. Equal keys keep their relative order in both
    /// directions.
    pub fn sort(&self, docs: &mut [Document]) {
        docs.sort_by(|a, b| self.compare(a, b));
    }
}
