//! Aggregation pipeline errors

use thiserror::Error;

/// Result type for pipeline parsing
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors raised while parsing a pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Stage has the wrong shape
    #[error("invalid pipeline stage {index}: {reason}")]
    InvalidStage { index: usize, reason: String },

    /// Stage operator outside the supported set, under the reject policy
    #[error("unsupported pipeline stage {stage} at index {index}")]
    UnsupportedStage { index: usize, stage: String },

    /// Accumulator operator outside the supported set, under the reject policy
    #[error("unsupported accumulator {operator} for output field {field}")]
    UnsupportedAccumulator { field: String, operator: String },

    /// Accumulator operand has the wrong shape
    #[error("invalid accumulator for output field {field}: {reason}")]
    InvalidAccumulator { field: String, reason: String },
}

impl PipelineError {
    /// Stable code for CLI error responses
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::InvalidStage { .. } => "MIRROR_PIPELINE_INVALID_STAGE",
            PipelineError::UnsupportedStage { .. } => "MIRROR_PIPELINE_UNSUPPORTED_STAGE",
            PipelineError::UnsupportedAccumulator { .. } => {
                "MIRROR_PIPELINE_UNSUPPORTED_ACCUMULATOR"
            }
            PipelineError::InvalidAccumulator { .. } => "MIRROR_PIPELINE_INVALID_ACCUMULATOR",
        }
    }
}
