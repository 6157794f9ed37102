//! Aggregation Engine
//!
//! Runs `$group`, `$sort`, `$project` and `$limit` stages over the full,
//! unfiltered document set. `$project` is accepted but leaves documents
//! unchanged. There is no `$match` stage; other stage names follow the
//! configured [`OperatorPolicy`](crate::filter::OperatorPolicy).

mod accumulator;
mod errors;
mod pipeline;
mod stage;

pub use errors::{PipelineError, PipelineResult};
pub use pipeline::Pipeline;
pub use stage::{Accumulator, GroupKey, GroupSpec, Stage, SumOperand};
