//! Filter dialect errors

use thiserror::Error;

/// Result type for filter parsing
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors raised while parsing a filter document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// The filter itself is not a mapping
    #[error("filter must be a JSON object, got {0}")]
    NotAnObject(String),

    /// Operator outside the supported set, under the reject policy
    #[error("unsupported filter operator {operator} on field {field}")]
    UnsupportedOperator { field: String, operator: String },

    /// Operator recognized but its operand has the wrong shape
    #[error("invalid operand for {operator} on field {field}: {reason}")]
    InvalidOperand {
        field: String,
        operator: String,
        reason: String,
    },

    /// `$regex` pattern failed to compile
    #[error("invalid $regex pattern on field {field}: {reason}")]
    InvalidPattern { field: String, reason: String },
}

impl FilterError {
    /// Stable code for CLI error responses
    pub fn code(&self) -> &'static str {
        match self {
            FilterError::NotAnObject(_) => "MIRROR_FILTER_INVALID",
            FilterError::UnsupportedOperator { .. } => "MIRROR_FILTER_UNSUPPORTED_OPERATOR",
            FilterError::InvalidOperand { .. } => "MIRROR_FILTER_INVALID_OPERAND",
            FilterError::InvalidPattern { .. } => "MIRROR_FILTER_INVALID_PATTERN",
        }
    }
}
