//! Predicate evaluation
//!
//! Evaluation walks the predicate tree through [`PredicateVisitor`], so the
//! document-matching rules live in one place.
//!
//! Absent fields never satisfy equality or range predicates. Pattern
//! predicates test an absent field as the empty string.

use serde_json::Value;

use super::ast::{Filter, Pattern, Predicate, RangeOp, TEXT_SEARCH_FIELDS};
use crate::document::{match_text, range_compare, values_equal, Document};

/// Visitor over the predicate variants
pub trait PredicateVisitor {
    type Output;

    fn visit_equality(&mut self, field: &str, value: &Value) -> Self::Output;
    fn visit_range(&mut self, field: &str, op: RangeOp, bound: &Value) -> Self::Output;
    fn visit_pattern(&mut self, field: &str, pattern: &Pattern) -> Self::Output;
    fn visit_text_search(&mut self, term: &str) -> Self::Output;
    fn visit_ignored(&mut self, field: &str, operator: &str) -> Self::Output;
}

impl Predicate {
    /// Dispatches to the visitor method for this variant
    pub fn accept<V: PredicateVisitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            Predicate::Equality { field, value } => visitor.visit_equality(field, value),
            Predicate::Range { field, op, bound } => visitor.visit_range(field, *op, bound),
            Predicate::Pattern { field, pattern } => visitor.visit_pattern(field, pattern),
            Predicate::TextSearch { term } => visitor.visit_text_search(term),
            Predicate::Ignored { field, operator } => visitor.visit_ignored(field, operator),
        }
    }
}

/// Tests predicates against one document
pub struct DocumentMatcher<'a> {
    doc: &'a Document,
}

impl<'a> DocumentMatcher<'a> {
    pub fn new(doc: &'a Document) -> Self {
        Self { doc }
    }
}

impl PredicateVisitor for DocumentMatcher<'_> {
    type Output = bool;

    fn visit_equality(&mut self, field: &str, value: &Value) -> bool {
        self.doc
            .get(field)
            .map(|actual| values_equal(actual, value))
            .unwrap_or(false)
    }

    fn visit_range(&mut self, field: &str, op: RangeOp, bound: &Value) -> bool {
        self.doc
            .get(field)
            .and_then(|actual| range_compare(actual, bound))
            .map(|ordering| op.holds(ordering))
            .unwrap_or(false)
    }

    fn visit_pattern(&mut self, field: &str, pattern: &Pattern) -> bool {
        pattern.is_match(&match_text(self.doc.get(field)))
    }

    fn visit_text_search(&mut self, term: &str) -> bool {
        let haystack = TEXT_SEARCH_FIELDS
            .iter()
            .map(|field| match_text(self.doc.get(*field)))
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        haystack.contains(term)
    }

    fn visit_ignored(&mut self, _field: &str, _operator: &str) -> bool {
        true
    }
}

impl Filter {
    /// Returns true if every predicate holds for `doc` (AND semantics)
    pub fn matches(&self, doc: &Document) -> bool {
        let mut matcher = DocumentMatcher::new(doc);
        self.predicates()
            .iter()
            .all(|predicate| predicate.accept(&mut matcher))
    }

    /// Keeps matching documents, preserving order
    pub fn apply(&self, docs: Vec<Document>) -> Vec<Document> {
        if self.is_match_all() {
            return docs;
        }
        docs.into_iter().filter(|doc| self.matches(doc)).collect()
    }
}
