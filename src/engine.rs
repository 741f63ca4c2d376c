//! Rule engine: holds rules in descending priority order, drives a `RuleIndex`
//! query, then verifies negated conditions directly before returning the
//! first fully-satisfied rule's result.

use crate::index::RuleIndex;
use crate::types::{ParsedUrl, Rule, RuleId};

struct SortedEntry {
    id: RuleId,
    all_negated: bool,
}

/// An immutable, indexed collection of rules. Construction is the only
/// place that does real work; `evaluate` is allocation-free and safe to
/// call concurrently from any number of threads.
pub struct RuleEngine {
    rules: Vec<Rule>,
    index: RuleIndex,
    sorted: Vec<SortedEntry>,
}

impl RuleEngine {
    /// Build the engine from a rule list. Rules are expected to carry
    /// `definition_index` values forming a dense `0..rules.len()`
    /// permutation matching their position in `rules` — the loader
    /// guarantees this; constructing a `RuleEngine` directly from
    /// hand-built rules must uphold the same invariant.
    pub fn new(rules: Vec<Rule>) -> Self {
        for (position, rule) in rules.iter().enumerate() {
            debug_assert_eq!(
                rule.definition_index, position,
                "rule definition_index must match its position in the input list"
            );
        }

        let index = RuleIndex::new(&rules);
        debug_assert_eq!(index.expected_counts().len(), rules.len());

        let mut sorted: Vec<SortedEntry> = rules
            .iter()
            .map(|r| SortedEntry { id: r.definition_index as RuleId, all_negated: r.all_negated() })
            .collect();
        // Stable sort: ties preserve the original (definition-index) order,
        // since `rules` — and therefore `sorted` before this call — is
        // already in ascending definition-index order.
        sorted.sort_by(|a, b| {
            let pa = &rules[a.id as usize];
            let pb = &rules[b.id as usize];
            pb.priority.cmp(&pa.priority)
        });

        tracing::info!(rules = rules.len(), "rule engine built");

        Self { rules, index, sorted }
    }

    pub fn rule_count(&self) -> usize {
        self.index.rule_count()
    }

    /// Evaluate `url` against every rule in priority order, returning the
    /// result of the first rule whose conditions all hold.
    pub fn evaluate(&self, url: &ParsedUrl) -> Option<&str> {
        self.index.query_candidates(url, |buffer| {
            for entry in &self.sorted {
                if !buffer.is_candidate(entry.id) && !entry.all_negated {
                    continue;
                }
                if !buffer.all_satisfied(entry.id) {
                    continue;
                }

                let rule = &self.rules[entry.id as usize];
                let negated_ok = rule.conditions.iter().filter(|c| c.negated).all(|c| c.holds(url));
                if negated_ok {
                    return Some(rule.result.as_str());
                }
            }
            None
        })
    }
}
