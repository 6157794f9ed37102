//! Pipeline stage parsing
//!
//! Stages are parsed once, up front, so a malformed pipeline fails before any
//! document is touched.

use serde_json::{Map, Number, Value};

use super::errors::{PipelineError, PipelineResult};
use crate::cursor::{SortDirection, SortSpec};
use crate::filter::{type_name, OperatorPolicy};
use crate::observability::{Event, Logger};

/// How a `$group` stage computes each document's key
#[derive(Debug, Clone, PartialEq)]
pub enum GroupKey {
    /// `"$field"`: the field's value; absent fields group under `""`
    Field(String),
    /// Any other `_id`, including an absent one (null): one group for all
    Literal(Value),
}

/// Operand of `$sum`
#[derive(Debug, Clone, PartialEq)]
pub enum SumOperand {
    /// Literal number: contributes that number per member (`1` counts members)
    Constant(Number),
    /// Field reference
    Field(String),
}

/// A per-group reduction
#[derive(Debug, Clone, PartialEq)]
pub enum Accumulator {
    Sum(SumOperand),
    Avg(String),
    Max(String),
    Min(String),
}

/// `$group` specification
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSpec {
    pub key: GroupKey,
    /// Output field and accumulator, in the order given
    pub accumulators: Vec<(String, Accumulator)>,
}

/// One pipeline stage
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Group(GroupSpec),
    /// Pairs in the order given; the first is the most significant key
    Sort(Vec<SortSpec>),
    /// Accepted and passed through unchanged
    Project(Value),
    Limit(usize),
    /// Unrecognized stage kept under the ignore policy
    Ignored(String),
}

impl Stage {
    pub fn name(&self) -> &str {
        match self {
            Stage::Group(_) => "$group",
            Stage::Sort(_) => "$sort",
            Stage::Project(_) => "$project",
            Stage::Limit(_) => "$limit",
            Stage::Ignored(name) => name.as_str(),
        }
    }
}

pub(super) struct StageParser {
    policy: OperatorPolicy,
}

impl StageParser {
    pub(super) fn new(policy: OperatorPolicy) -> Self {
        Self { policy }
    }

    pub(super) fn parse_stage(&self, index: usize, value: &Value) -> PipelineResult<Stage> {
        let invalid = |reason: String| PipelineError::InvalidStage { index, reason };

        let obj = value
            .as_object()
            .ok_or_else(|| invalid(format!("stage must be an object, got {}", type_name(value))))?;

        if obj.len() != 1 {
            return Err(invalid(format!(
                "stage must have exactly one operator, got {}",
                obj.len()
            )));
        }

        let (name, spec) = obj
            .iter()
            .next()
            .ok_or_else(|| invalid("empty stage".to_string()))?;

        match name.as_str() {
            "$group" => self.parse_group(index, spec).map(Stage::Group),
            "$sort" => parse_sort(index, spec).map(Stage::Sort),
            "$project" => Ok(Stage::Project(spec.clone())),
            "$limit" => spec
                .as_u64()
                .map(|n| Stage::Limit(n as usize))
                .ok_or_else(|| invalid(format!("$limit must be a non-negative integer, got {}", spec))),
            other => match self.policy {
                OperatorPolicy::Reject => Err(PipelineError::UnsupportedStage {
                    index,
                    stage: other.to_string(),
                }),
                OperatorPolicy::Ignore => {
                    let position = index.to_string();
                    Logger::warn(
                        Event::PipelineStageIgnored,
                        &[("stage", other), ("index", position.as_str())],
                    );
                    Ok(Stage::Ignored(other.to_string()))
                }
            },
        }
    }

    fn parse_group(&self, index: usize, spec: &Value) -> PipelineResult<GroupSpec> {
        let obj = spec.as_object().ok_or_else(|| PipelineError::InvalidStage {
            index,
            reason: format!("$group must be an object, got {}", type_name(spec)),
        })?;

        let key = match obj.get("_id") {
            Some(Value::String(expr)) if expr.starts_with('$') => {
                GroupKey::Field(expr.trim_start_matches('$').to_string())
            }
            Some(literal) => GroupKey::Literal(literal.clone()),
            None => GroupKey::Literal(Value::Null),
        };

        let mut accumulators = Vec::new();
        for (field, expr) in obj {
            if field == "_id" {
                continue;
            }
            if let Some(accumulator) = self.parse_accumulator(field, expr)? {
                accumulators.push((field.clone(), accumulator));
            }
        }

        Ok(GroupSpec { key, accumulators })
    }

    fn parse_accumulator(&self, field: &str, expr: &Value) -> PipelineResult<Option<Accumulator>> {
        let invalid = |reason: String| PipelineError::InvalidAccumulator {
            field: field.to_string(),
            reason,
        };

        let (op, operand) = match expr.as_object().and_then(|obj| obj.iter().next()) {
            Some(entry) => entry,
            None => return self.unsupported(field, &expr.to_string()).map(|_| None),
        };

        let field_ref = |operand: &Value| -> PipelineResult<String> {
            operand
                .as_str()
                .map(|s| s.trim_start_matches('$').to_string())
                .ok_or_else(|| {
                    invalid(format!(
                        "{} expects a field reference, got {}",
                        op,
                        type_name(operand)
                    ))
                })
        };

        let accumulator = match op.as_str() {
            "$sum" => match operand {
                Value::Number(n) => Accumulator::Sum(SumOperand::Constant(n.clone())),
                other => Accumulator::Sum(SumOperand::Field(field_ref(other)?)),
            },
            "$avg" => Accumulator::Avg(field_ref(operand)?),
            "$max" => Accumulator::Max(field_ref(operand)?),
            "$min" => Accumulator::Min(field_ref(operand)?),
            other => return self.unsupported(field, other).map(|_| None),
        };

        Ok(Some(accumulator))
    }

    fn unsupported(&self, field: &str, operator: &str) -> PipelineResult<()> {
        match self.policy {
            OperatorPolicy::Reject => Err(PipelineError::UnsupportedAccumulator {
                field: field.to_string(),
                operator: operator.to_string(),
            }),
            OperatorPolicy::Ignore => {
                Logger::warn(
                    Event::PipelineStageIgnored,
                    &[
                        ("stage", "$group"),
                        ("field", field),
                        ("accumulator", operator),
                    ],
                );
                Ok(())
            }
        }
    }
}

fn parse_sort(index: usize, spec: &Value) -> PipelineResult<Vec<SortSpec>> {
    let obj: &Map<String, Value> = spec.as_object().ok_or_else(|| PipelineError::InvalidStage {
        index,
        reason: format!("$sort must be an object, got {}", type_name(spec)),
    })?;

    obj.iter()
        .map(|(field, direction)| {
            SortDirection::from_value(direction)
                .map(|direction| SortSpec::new(field.clone(), direction))
                .ok_or_else(|| PipelineError::InvalidStage {
                    index,
                    reason: format!("$sort direction for {} must be an integer", field),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> PipelineResult<Stage> {
        StageParser::new(OperatorPolicy::Ignore).parse_stage(0, &value)
    }

    #[test]
    fn test_parse_group_with_accumulators() {
        let stage = parse(json!({"$group": {
            "_id": "$channel",
            "count": {"$sum": 1},
            "views": {"$sum": "$view_count"},
            "avg_views": {"$avg": "$view_count"},
            "latest": {"$max": "$upload_date"},
        }}))
        .unwrap();

        let spec = match stage {
            Stage::Group(spec) => spec,
            other => panic!("unexpected stage {:?}", other),
        };
        assert_eq!(spec.key, GroupKey::Field("channel".into()));
        let names: Vec<_> = spec.accumulators.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["count", "views", "avg_views", "latest"]);
        assert_eq!(
            spec.accumulators[0].1,
            Accumulator::Sum(SumOperand::Constant(1.into()))
        );
        assert_eq!(
            spec.accumulators[3].1,
            Accumulator::Max("upload_date".into())
        );
    }

    #[test]
    fn test_group_literal_and_absent_id() {
        match parse(json!({"$group": {"_id": null, "n": {"$sum": 1}}})).unwrap() {
            Stage::Group(spec) => assert_eq!(spec.key, GroupKey::Literal(Value::Null)),
            other => panic!("unexpected stage {:?}", other),
        }
        match parse(json!({"$group": {"n": {"$sum": 1}}})).unwrap() {
            Stage::Group(spec) => assert_eq!(spec.key, GroupKey::Literal(Value::Null)),
            other => panic!("unexpected stage {:?}", other),
        }
    }

    #[test]
    fn test_parse_sort_keeps_order() {
        let stage = parse(json!({"$sort": {"count": -1, "_id": 1}})).unwrap();
        assert_eq!(
            stage,
            Stage::Sort(vec![SortSpec::desc("count"), SortSpec::asc("_id")])
        );
    }

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse(json!({"$limit": 3})).unwrap(), Stage::Limit(3));
        assert!(parse(json!({"$limit": -1})).is_err());
        assert!(parse(json!({"$limit": "3"})).is_err());
    }

    #[test]
    fn test_unknown_stage_policy() {
        assert_eq!(
            parse(json!({"$match": {"channel": "A"}})).unwrap(),
            Stage::Ignored("$match".into())
        );

        let err = StageParser::new(OperatorPolicy::Reject)
            .parse_stage(2, &json!({"$unwind": "$tags"}))
            .unwrap_err();
        assert_eq!(
            err,
            PipelineError::UnsupportedStage {
                index: 2,
                stage: "$unwind".into()
            }
        );
    }

    #[test]
    fn test_unknown_accumulator_policy() {
        match parse(json!({"$group": {"_id": "$c", "first": {"$first": "$t"}}})).unwrap() {
            Stage::Group(spec) => assert!(spec.accumulators.is_empty()),
            other => panic!("unexpected stage {:?}", other),
        }

        let err = StageParser::new(OperatorPolicy::Reject)
            .parse_stage(0, &json!({"$group": {"_id": "$c", "first": {"$first": "$t"}}}))
            .unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedAccumulator { .. }));
    }

    #[test]
    fn test_malformed_stages() {
        assert!(parse(json!("$group")).is_err());
        assert!(parse(json!({})).is_err());
        assert!(parse(json!({"$sort": {"a": 1}, "$limit": 1})).is_err());
        assert!(parse(json!({"$sort": {"a": "desc"}})).is_err());
        assert!(parse(json!({"$group": {"_id": "$c", "avg": {"$avg": 3}}})).is_err());
    }
}
