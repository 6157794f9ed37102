//! Typed predicate tree for the filter dialect
//!
//! A filter document is parsed once into a conjunction of predicates. The
//! matcher never sees string-keyed operators.

use std::cmp::Ordering;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fields scanned by `$text` search, concatenated in this order
pub const TEXT_SEARCH_FIELDS: [&str; 2] = ["title", "description"];

/// What to do with an operator (or pipeline stage) outside the supported set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorPolicy {
    /// Keep the predicate as a pass-through that matches everything
    #[default]
    Ignore,
    /// Fail the operation with an unsupported-operator error
    Reject,
}

impl OperatorPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatorPolicy::Ignore => "ignore",
            OperatorPolicy::Reject => "reject",
        }
    }
}

/// Ordered comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOp {
    Gt,
    Gte,
    Lt,
    Lte,
}

impl RangeOp {
    /// Parses a dialect operator key (`$gte`, ...)
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "$gt" => Some(RangeOp::Gt),
            "$gte" => Some(RangeOp::Gte),
            "$lt" => Some(RangeOp::Lt),
            "$lte" => Some(RangeOp::Lte),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RangeOp::Gt => "$gt",
            RangeOp::Gte => "$gte",
            RangeOp::Lt => "$lt",
            RangeOp::Lte => "$lte",
        }
    }

    /// Whether `actual.cmp(bound) == ordering` satisfies this operator
    pub fn holds(&self, ordering: Ordering) -> bool {
        match self {
            RangeOp::Gt => ordering == Ordering::Greater,
            RangeOp::Gte => ordering != Ordering::Less,
            RangeOp::Lt => ordering == Ordering::Less,
            RangeOp::Lte => ordering != Ordering::Greater,
        }
    }
}

/// A compiled `$regex` operand
#[derive(Clone)]
pub struct Pattern {
    source: String,
    options: String,
    regex: Regex,
}

impl Pattern {
    pub(crate) fn new(source: String, options: String, regex: Regex) -> Self {
        Self {
            source,
            options,
            regex,
        }
    }

    /// The pattern as written by the caller
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The `$options` flags as written by the caller
    pub fn options(&self) -> &str {
        &self.options
    }

    pub fn case_insensitive(&self) -> bool {
        self.options.contains('i')
    }

    /// Unanchored search, like a substring match
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.options == other.options
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("source", &self.source)
            .field("options", &self.options)
            .finish()
    }
}

/// A single predicate of the conjunction
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `{field: value}`
    Equality { field: String, value: Value },
    /// `{field: {"$gte": bound}}` and friends
    Range {
        field: String,
        op: RangeOp,
        bound: Value,
    },
    /// `{field: {"$regex": p, "$options": flags}}`
    Pattern { field: String, pattern: Pattern },
    /// `{"$text": {"$search": term}}`; `term` is stored lowercased
    TextSearch { term: String },
    /// Unrecognized operator kept under the ignore policy; matches everything
    Ignored { field: String, operator: String },
}

/// Parsed filter: all predicates must hold
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    /// The empty filter, matching every document
    pub fn all() -> Self {
        Self::default()
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Adds a predicate
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub(crate) fn push(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    /// Adds an equality predicate
    pub fn eq(self, field: impl Into<String>, value: Value) -> Self {
        self.with_predicate(Predicate::Equality {
            field: field.into(),
            value,
        })
    }

    /// Adds a range predicate
    pub fn range(self, field: impl Into<String>, op: RangeOp, bound: Value) -> Self {
        self.with_predicate(Predicate::Range {
            field: field.into(),
            op,
            bound,
        })
    }

    /// Adds a `$text` search
    pub fn text(self, term: &str) -> Self {
        self.with_predicate(Predicate::TextSearch {
            term: term.to_lowercase(),
        })
    }

    /// True when no predicate can reject a document
    pub fn is_match_all(&self) -> bool {
        self.predicates
            .iter()
            .all(|p| matches!(p, Predicate::Ignored { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_range_op_boundaries() {
        assert!(RangeOp::Gte.holds(Ordering::Equal));
        assert!(RangeOp::Lte.holds(Ordering::Equal));
        assert!(!RangeOp::Gt.holds(Ordering::Equal));
        assert!(!RangeOp::Lt.holds(Ordering::Equal));
        assert!(RangeOp::Lt.holds(Ordering::Less));
    }

    #[test]
    fn test_range_op_keys() {
        for key in ["$gt", "$gte", "$lt", "$lte"] {
            assert_eq!(RangeOp::from_key(key).unwrap().as_str(), key);
        }
        assert_eq!(RangeOp::from_key("$ne"), None);
    }

    #[test]
    fn test_filter_builder() {
        let filter = Filter::all()
            .eq("channel", json!("A"))
            .range("view_count", RangeOp::Gte, json!(100))
            .text("Fed");

        assert_eq!(filter.predicates().len(), 3);
        assert!(!filter.is_match_all());
        assert_eq!(
            filter.predicates()[2],
            Predicate::TextSearch { term: "fed".into() }
        );
    }

    #[test]
    fn test_ignored_only_filter_matches_all() {
        let filter = Filter::all().with_predicate(Predicate::Ignored {
            field: "$or".into(),
            operator: "$or".into(),
        });
        assert!(filter.is_match_all());
        assert!(Filter::all().is_match_all());
    }

    #[test]
    fn test_policy_deserialize() {
        let policy: OperatorPolicy = serde_json::from_value(json!("reject")).unwrap();
        assert_eq!(policy, OperatorPolicy::Reject);
        assert_eq!(OperatorPolicy::default(), OperatorPolicy::Ignore);
    }
}
