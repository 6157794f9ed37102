//! Pipeline execution

use std::collections::HashMap;

use serde_json::Value;

use super::errors::PipelineResult;
use super::stage::{GroupKey, GroupSpec, Stage, StageParser};
use crate::document::Document;
use crate::filter::OperatorPolicy;

/// A parsed aggregation pipeline
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    /// Parses stage specifications, in order.
    pub fn parse(stages: &[Value], policy: OperatorPolicy) -> PipelineResult<Self> {
        let parser = StageParser::new(policy);
        let stages = stages
            .iter()
            .enumerate()
            .map(|(index, stage)| parser.parse_stage(index, stage))
            .collect::<PipelineResult<Vec<_>>>()?;
        Ok(Self { stages })
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Threads `docs` through every stage.
    ///
    /// An empty pipeline returns its input unchanged.
    pub fn execute(&self, docs: Vec<Document>) -> Vec<Document> {
        self.stages
            .iter()
            .fold(docs, |docs, stage| execute_stage(stage, docs))
    }
}

fn execute_stage(stage: &Stage, mut docs: Vec<Document>) -> Vec<Document> {
    match stage {
        Stage::Group(spec) => execute_group(spec, &docs),
        Stage::Sort(specs) => {
            // One stable pass per key, least significant first
            for spec in specs.iter().rev() {
                spec.sort(&mut docs);
            }
            docs
        }
        Stage::Project(_) | Stage::Ignored(_) => docs,
        Stage::Limit(n) => {
            docs.truncate(*n);
            docs
        }
    }
}

/// Groups in first-seen order; keys compare by their JSON text.
fn execute_group(spec: &GroupSpec, docs: &[Document]) -> Vec<Document> {
    let mut order: Vec<(Value, Vec<&Document>)> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();

    for doc in docs {
        let key = match &spec.key {
            GroupKey::Field(field) => doc
                .get(field)
                .cloned()
                .unwrap_or_else(|| Value::String(String::new())),
            GroupKey::Literal(value) => value.clone(),
        };

        let key_text = key.to_string();
        match slots.get(&key_text) {
            Some(&slot) => order[slot].1.push(doc),
            None => {
                slots.insert(key_text, order.len());
                order.push((key, vec![doc]));
            }
        }
    }

    order
        .into_iter()
        .map(|(key, members)| {
            let mut out = Document::new();
            out.insert("_id".to_string(), key);
            for (field, accumulator) in &spec.accumulators {
                out.insert(field.clone(), accumulator.evaluate(&members));
            }
            out
        })
        .collect()
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

    fn run(stages: Value, input: Vec<Document>) -> Vec<Document> {
        let stages = stages.as_array().unwrap().clone();
        Pipeline::parse(&stages, OperatorPolicy::Ignore)
            .unwrap()
            .execute(input)
    }

    fn channel_docs() -> Vec<Document> {
        docs(vec![
            json!({"record_id": "a1", "channel": "A", "view_count": 10}),
            json!({"record_id": "b1", "channel": "B", "view_count": 40}),
            json!({"record_id": "a2", "channel": "A", "view_count": 20}),
            json!({"record_id": "a3", "channel": "A", "view_count": 30}),
            json!({"record_id": "b2", "channel": "B", "view_count": 60}),
        ])
    }

    #[test]
    fn test_group_count_per_channel() {
        let out = run(
            json!([{"$group": {"_id": "$channel", "count": {"$sum": 1}}}]),
            channel_docs(),
        );
        assert_eq!(
            out,
            docs(vec![
                json!({"_id": "A", "count": 3}),
                json!({"_id": "B", "count": 2}),
            ])
        );
    }

    #[test]
    fn test_group_sort_limit() {
        let out = run(
            json!([
                {"$group": {
                    "_id": "$channel",
                    "total_views": {"$sum": "$view_count"},
                    "avg_views": {"$avg": "$view_count"}
                }},
                {"$sort": {"total_views": -1}},
                {"$limit": 1}
            ]),
            channel_docs(),
        );
        assert_eq!(
            out,
            docs(vec![json!({"_id": "B", "total_views": 100, "avg_views": 50.0})])
        );
    }

    #[test]
    fn test_group_missing_key_is_empty_string() {
        let out = run(
            json!([{"$group": {"_id": "$channel", "n": {"$sum": 1}}}]),
            docs(vec![json!({"channel": "A"}), json!({}), json!({})]),
        );
        assert_eq!(out[1], docs(vec![json!({"_id": "", "n": 2})])[0]);
    }

    #[test]
    fn test_group_literal_key_is_single_group() {
        let out = run(
            json!([{"$group": {"_id": null, "total": {"$sum": "$view_count"}}}]),
            channel_docs(),
        );
        assert_eq!(out, docs(vec![json!({"_id": null, "total": 160})]));
    }

    #[test]
    fn test_multi_key_sort_tie_breaking() {
        let input = docs(vec![
            json!({"id": 1, "g": "x", "n": 2}),
            json!({"id": 2, "g": "y", "n": 1}),
            json!({"id": 3, "g": "x", "n": 1}),
            json!({"id": 4, "g": "y", "n": 2}),
            json!({"id": 5, "g": "x", "n": 1}),
        ]);
        let out = run(json!([{"$sort": {"g": 1, "n": -1}}]), input);
        let ids: Vec<_> = out.iter().map(|d| d["id"].clone()).collect();
        assert_eq!(ids, vec![json!(1), json!(3), json!(5), json!(4), json!(2)]);
    }

    #[test]
    fn test_project_is_pass_through() {
        let input = channel_docs();
        let out = run(json!([{"$project": {"channel": 1}}]), input.clone());
        assert_eq!(out, input);
    }

    #[test]
    fn test_empty_pipeline_returns_input() {
        let input = channel_docs();
        assert_eq!(run(json!([]), input.clone()), input);
    }

    #[test]
    fn test_ignored_stage_passes_through() {
        let input = channel_docs();
        let out = run(json!([{"$match": {"channel": "A"}}, {"$limit": 2}]), input.clone());
        assert_eq!(out, input[..2].to_vec());
    }

    #[test]
    fn test_parse_error_reports_index() {
        let stages = vec![json!({"$limit": 1}), json!({"$sort": []})];
        let err = Pipeline::parse(&stages, OperatorPolicy::Ignore).unwrap_err();
        assert!(err.to_string().contains("stage 1"));
    }
}
