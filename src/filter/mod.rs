//! Filter Engine
//!
//! Parses the document database's filter dialect into a typed predicate tree
//! and evaluates it against documents.
//!
//! Supported: equality, `$gt`/`$gte`/`$lt`/`$lte`, `$regex` with `$options`,
//! and top-level `$text: {$search}`. Anything else is handled according to
//! [`OperatorPolicy`].

mod ast;
mod errors;
mod matcher;
mod parser;

pub use ast::{Filter, OperatorPolicy, Pattern, Predicate, RangeOp, TEXT_SEARCH_FIELDS};
pub use errors::{FilterError, FilterResult};
pub use matcher::{DocumentMatcher, PredicateVisitor};
pub use parser::FilterParser;

pub(crate) use parser::type_name;
