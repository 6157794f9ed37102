//! Accumulator evaluation over one group's members

use std::cmp::Ordering;

use serde_json::{Number, Value};

use super::stage::{Accumulator, SumOperand};
use crate::document::{compare_values, Document};

/// Running sum that stays integral until a float shows up
#[derive(Debug, Default)]
struct NumericSum {
    int: i64,
    float: f64,
    is_float: bool,
}

impl NumericSum {
    fn add(&mut self, value: Option<&Value>) {
        let number = match value {
            Some(Value::Number(n)) => n,
            _ => return,
        };

        if !self.is_float {
            if let Some(i) = number.as_i64() {
                if let Some(sum) = self.int.checked_add(i) {
                    self.int = sum;
                    return;
                }
            }
            self.is_float = true;
            self.float = self.int as f64;
        }
        self.float += number.as_f64().unwrap_or(0.0);
    }

    fn as_f64(&self) -> f64 {
        if self.is_float {
            self.float
        } else {
            self.int as f64
        }
    }

    fn into_value(self) -> Value {
        if self.is_float {
            float_value(self.float)
        } else {
            Value::from(self.int)
        }
    }
}

fn float_value(f: f64) -> Value {
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}

impl Accumulator {
    /// Reduces `members` (never empty) to one value
    pub fn evaluate(&self, members: &[&Document]) -> Value {
        match self {
            Accumulator::Sum(SumOperand::Constant(n)) => {
                let count = members.len() as i64;
                match n.as_i64().and_then(|i| i.checked_mul(count)) {
                    Some(total) => Value::from(total),
                    None => float_value(n.as_f64().unwrap_or(0.0) * count as f64),
                }
            }
            Accumulator::Sum(SumOperand::Field(field)) => {
                let mut sum = NumericSum::default();
                for doc in members {
                    sum.add(doc.get(field));
                }
                sum.into_value()
            }
            Accumulator::Avg(field) => {
                if members.is_empty() {
                    return Value::Null;
                }
                let mut sum = NumericSum::default();
                for doc in members {
                    sum.add(doc.get(field));
                }
                float_value(sum.as_f64() / members.len() as f64)
            }
            Accumulator::Max(field) => extreme(members, field, Ordering::Greater),
            Accumulator::Min(field) => extreme(members, field, Ordering::Less),
        }
    }
}

/// First value that no later value beats in `wanted` direction; missing
/// and null values are skipped.
fn extreme(members: &[&Document], field: &str, wanted: Ordering) -> Value {
    members
        .iter()
        .filter_map(|doc| doc.get(field))
        .filter(|value| !value.is_null())
        .fold(None, |best: Option<&Value>, value| match best {
            Some(current) if compare_values(value, current) != wanted => Some(current),
            _ => Some(value),
        })
        .cloned()
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn docs(values: Vec<Value>) -> Vec<Document> {
        values
            .into_iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    fn eval(acc: Accumulator, members: &[Document]) -> Value {
        let refs: Vec<&Document> = members.iter().collect();
        acc.evaluate(&refs)
    }

    #[test]
    fn test_sum_constant_counts() {
        let members = docs(vec![json!({}), json!({}), json!({})]);
        assert_eq!(
            eval(Accumulator::Sum(SumOperand::Constant(1.into())), &members),
            json!(3)
        );
        assert_eq!(
            eval(Accumulator::Sum(SumOperand::Constant(2.into())), &members),
            json!(6)
        );
    }

    #[test]
    fn test_sum_field_treats_missing_as_zero() {
        let members = docs(vec![
            json!({"v": 10}),
            json!({}),
            json!({"v": null}),
            json!({"v": "x"}),
            json!({"v": 5}),
        ]);
        assert_eq!(
            eval(Accumulator::Sum(SumOperand::Field("v".into())), &members),
            json!(15)
        );
    }

    #[test]
    fn test_sum_switches_to_float() {
        let members = docs(vec![json!({"v": 1}), json!({"v": 0.5})]);
        assert_eq!(
            eval(Accumulator::Sum(SumOperand::Field("v".into())), &members),
            json!(1.5)
        );
    }

    #[test]
    fn test_avg_counts_missing_as_zero() {
        let members = docs(vec![json!({"v": 10}), json!({"v": 20}), json!({})]);
        assert_eq!(eval(Accumulator::Avg("v".into()), &members), json!(10.0));
    }

    #[test]
    fn test_max_min_skip_missing() {
        let members = docs(vec![
            json!({"d": "2026-02-01"}),
            json!({}),
            json!({"d": "2026-03-01"}),
            json!({"d": null}),
        ]);
        assert_eq!(eval(Accumulator::Max("d".into()), &members), json!("2026-03-01"));
        assert_eq!(eval(Accumulator::Min("d".into()), &members), json!("2026-02-01"));
    }

    #[test]
    fn test_max_of_all_missing_is_null() {
        let members = docs(vec![json!({}), json!({"d": null})]);
        assert_eq!(eval(Accumulator::Max("d".into()), &members), Value::Null);
    }
}
