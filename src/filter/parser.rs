//! Filter document parser
//!
//! Turns a JSON filter into a [`Filter`]. Top-level keys are ANDed. A key
//! mapped to a plain value is an equality test; a key mapped to a mapping is
//! an operator set. `$text` is the only top-level operator.

use regex::RegexBuilder;
use serde_json::{Map, Value};

use super::ast::{Filter, OperatorPolicy, Pattern, Predicate, RangeOp};
use super::errors::{FilterError, FilterResult};
use crate::observability::{Event, Logger};

const TEXT_OPERATOR: &str = "$text";
const SEARCH_KEY: &str = "$search";
const REGEX_KEY: &str = "$regex";
const OPTIONS_KEY: &str = "$options";

/// Parses filter documents under a fixed unsupported-operator policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterParser {
    policy: OperatorPolicy,
}

impl FilterParser {
    pub fn new(policy: OperatorPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> OperatorPolicy {
        self.policy
    }

    /// Parses `filter`. `null` is accepted as "no filter".
    pub fn parse(&self, filter: &Value) -> FilterResult<Filter> {
        match filter {
            Value::Null => Ok(Filter::all()),
            Value::Object(map) => self.parse_map(map),
            other => Err(FilterError::NotAnObject(type_name(other).to_string())),
        }
    }

    /// Parses an already-unwrapped filter mapping.
    pub fn parse_map(&self, map: &Map<String, Value>) -> FilterResult<Filter> {
        let mut filter = Filter::all();

        for (key, cond) in map {
            if key == TEXT_OPERATOR {
                filter.push(parse_text(cond)?);
            } else if key.starts_with('$') {
                filter.push(self.unsupported(key, key)?);
            } else if let Value::Object(ops) = cond {
                self.parse_operators(key, ops, &mut filter)?;
            } else {
                filter.push(Predicate::Equality {
                    field: key.clone(),
                    value: cond.clone(),
                });
            }
        }

        Ok(filter)
    }

    fn parse_operators(
        &self,
        field: &str,
        ops: &Map<String, Value>,
        filter: &mut Filter,
    ) -> FilterResult<()> {
        for (op, operand) in ops {
            if let Some(range) = RangeOp::from_key(op) {
                filter.push(Predicate::Range {
                    field: field.to_string(),
                    op: range,
                    bound: operand.clone(),
                });
            } else if op == REGEX_KEY {
                let options = match ops.get(OPTIONS_KEY) {
                    None | Some(Value::Null) => "",
                    Some(Value::String(flags)) => flags.as_str(),
                    Some(other) => {
                        return Err(FilterError::InvalidOperand {
                            field: field.to_string(),
                            operator: OPTIONS_KEY.to_string(),
                            reason: format!("expected a string, got {}", type_name(other)),
                        })
                    }
                };
                filter.push(Predicate::Pattern {
                    field: field.to_string(),
                    pattern: compile_pattern(field, operand, options)?,
                });
            } else if op == OPTIONS_KEY {
                // consumed alongside $regex
            } else {
                filter.push(self.unsupported(field, op)?);
            }
        }
        Ok(())
    }

    fn unsupported(&self, field: &str, operator: &str) -> FilterResult<Predicate> {
        match self.policy {
            OperatorPolicy::Reject => Err(FilterError::UnsupportedOperator {
                field: field.to_string(),
                operator: operator.to_string(),
            }),
            OperatorPolicy::Ignore => {
                Logger::warn(
                    Event::FilterOperatorIgnored,
                    &[("field", field), ("operator", operator)],
                );
                Ok(Predicate::Ignored {
                    field: field.to_string(),
                    operator: operator.to_string(),
                })
            }
        }
    }
}

fn parse_text(cond: &Value) -> FilterResult<Predicate> {
    let invalid = |reason: String| FilterError::InvalidOperand {
        field: TEXT_OPERATOR.to_string(),
        operator: TEXT_OPERATOR.to_string(),
        reason,
    };

    let spec = cond
        .as_object()
        .ok_or_else(|| invalid(format!("expected an object, got {}", type_name(cond))))?;

    let term = match spec.get(SEARCH_KEY) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(term)) => term.to_lowercase(),
        Some(other) => {
            return Err(invalid(format!(
                "$search must be a string, got {}",
                type_name(other)
            )))
        }
    };

    Ok(Predicate::TextSearch { term })
}

fn compile_pattern(field: &str, operand: &Value, options: &str) -> FilterResult<Pattern> {
    let source = operand.as_str().ok_or_else(|| FilterError::InvalidOperand {
        field: field.to_string(),
        operator: REGEX_KEY.to_string(),
        reason: format!("expected a string, got {}", type_name(operand)),
    })?;

    let mut builder = RegexBuilder::new(source);
    for flag in options.chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'x' => {
                builder.ignore_whitespace(true);
            }
            // other flags have no effect here
            _ => {}
        }
    }

    let regex = builder.build().map_err(|e| FilterError::InvalidPattern {
        field: field.to_string(),
        reason: e.to_string(),
    })?;

    Ok(Pattern::new(source.to_string(), options.to_string(), regex))
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
