//! Errors from the rule-specification loading boundary.
//!
//! Everything here is recoverable and fatal only at startup, per the error
//! taxonomy: a malformed rule file stops the CLI before any matching ever
//! happens. The matching engine itself never produces one of these once
//! construction has succeeded.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleLoadError {
    #[error("invalid rule specification JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rule {0:?} (definition index {1}) has no conditions")]
    EmptyConditions(String, usize),

    #[error("rule {0:?} (definition index {1}) has unknown part {2:?}")]
    UnknownPart(String, usize, String),

    #[error("rule {0:?} (definition index {1}) has unknown operator {2:?}")]
    UnknownOperator(String, usize, String),
}
