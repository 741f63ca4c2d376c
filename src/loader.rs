//! Rule specification loader: the JSON-shaped external collaborator
//! described in the external interfaces. Not part of the matching engine's
//! hard engineering, but the loader is where the open question on
//! zero-condition rules is resolved — see `RuleLoadError::EmptyConditions`.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::error::RuleLoadError;
use crate::types::{Condition, Operator, Rule, UrlPart};

#[derive(Debug, Deserialize)]
struct RuleSpec {
    name: String,
    priority: i64,
    conditions: Vec<ConditionSpec>,
    result: String,
}

#[derive(Debug, Deserialize)]
struct ConditionSpec {
    part: String,
    operator: String,
    value: String,
    #[serde(default)]
    negated: bool,
}

fn parse_part(name: &str) -> Option<UrlPart> {
    match name.to_ascii_lowercase().as_str() {
        "host" => Some(UrlPart::Host),
        "path" => Some(UrlPart::Path),
        "file" => Some(UrlPart::File),
        "query" => Some(UrlPart::Query),
        _ => None,
    }
}

fn parse_operator(name: &str) -> Option<Operator> {
    match name.to_ascii_lowercase().as_str() {
        "equals" => Some(Operator::Equals),
        "contains" => Some(Operator::Contains),
        "starts_with" => Some(Operator::StartsWith),
        "ends_with" => Some(Operator::EndsWith),
        _ => None,
    }
}

/// Load rules from a JSON array of rule objects.
pub fn load_rules_from_str(json: &str) -> Result<Vec<Rule>, RuleLoadError> {
    let specs: Vec<RuleSpec> = serde_json::from_str(json)?;
    compile(specs)
}

/// Load rules from a rule-specification file on disk.
pub fn load_rules_from_path(path: &Path) -> anyhow::Result<Vec<Rule>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read rule file {}", path.display()))?;
    load_rules_from_str(&content)
        .with_context(|| format!("failed to parse rule file {}", path.display()))
}

fn compile(specs: Vec<RuleSpec>) -> Result<Vec<Rule>, RuleLoadError> {
    let mut rules = Vec::with_capacity(specs.len());

    for (index, spec) in specs.into_iter().enumerate() {
        if spec.conditions.is_empty() {
            return Err(RuleLoadError::EmptyConditions(spec.name, index));
        }

        let mut conditions = Vec::with_capacity(spec.conditions.len());
        for c in spec.conditions {
            let part = parse_part(&c.part)
                .ok_or_else(|| RuleLoadError::UnknownPart(spec.name.clone(), index, c.part.clone()))?;
            let operator = parse_operator(&c.operator).ok_or_else(|| {
                RuleLoadError::UnknownOperator(spec.name.clone(), index, c.operator.clone())
            })?;
            conditions.push(Condition::new(part, operator, c.value, c.negated));
        }

        rules.push(Rule::new(spec.name, spec.priority, conditions, spec.result, index));
    }

    Ok(rules)
}
