//! Rule index: per-(part, operator) dispatch to the prefix/substring
//! automata or an equals hash map, driving per-query candidate
//! accumulation.
//!
//! Per-operator structures are stored in flat arrays indexed by
//! `UrlPart::as_index()` rather than a general map, keeping the hot query
//! path branch-free. A boolean flag per (part, operator) records whether
//! any condition of that shape exists at all, so the query loop can skip
//! empty indexes entirely.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::automaton::{PrefixAutomaton, SubstringAutomaton};
use crate::buffer::CandidateBuffer;
use crate::types::{Operator, ParsedUrl, Rule, RuleId, UrlPart};

const PARTS: usize = UrlPart::COUNT;

pub struct RuleIndex {
    equals: [HashMap<String, Vec<RuleId>>; PARTS],
    starts_with: [PrefixAutomaton<RuleId>; PARTS],
    // Keyed by the *reversed* condition value; queried with the reversed
    // URL part so that "prefix of reversed input" means "suffix of input".
    ends_with: [PrefixAutomaton<RuleId>; PARTS],
    contains: [SubstringAutomaton<RuleId>; PARTS],
    has_equals: [bool; PARTS],
    has_starts_with: [bool; PARTS],
    has_ends_with: [bool; PARTS],
    has_contains: [bool; PARTS],
    expected_counts: Arc<[u32]>,
}

thread_local! {
    static BUFFER_CACHE: RefCell<Option<CandidateBuffer>> = const { RefCell::new(None) };
    static REVERSE_SCRATCH: RefCell<String> = const { RefCell::new(String::new()) };
    // CONTAINS dedup: `SubstringAutomaton::search` emits once per occurrence
    // of a pattern, but a rule's satisfaction counter must only ever gain one
    // increment per condition per query, so occurrences of the same rule's
    // pattern within one part's value are collapsed here before incrementing.
    static SEEN_SCRATCH: RefCell<HashSet<RuleId>> = RefCell::new(HashSet::new());
}

impl RuleIndex {
    /// Build the index from a rule list. Rule IDs are taken directly from
    /// each rule's `definition_index`, which the caller (`RuleEngine`)
    /// guarantees is a dense `0..N-1` permutation.
    pub fn new(rules: &[Rule]) -> Self {
        let rule_count = rules.len();
        let mut equals: [HashMap<String, Vec<RuleId>>; PARTS] =
            std::array::from_fn(|_| HashMap::new());
        let mut starts_with: [PrefixAutomaton<RuleId>; PARTS] =
            std::array::from_fn(|_| PrefixAutomaton::new());
        let mut ends_with: [PrefixAutomaton<RuleId>; PARTS] =
            std::array::from_fn(|_| PrefixAutomaton::new());
        let mut contains: [SubstringAutomaton<RuleId>; PARTS] =
            std::array::from_fn(|_| SubstringAutomaton::new());
        let mut has_equals = [false; PARTS];
        let mut has_starts_with = [false; PARTS];
        let mut has_ends_with = [false; PARTS];
        let mut has_contains = [false; PARTS];
        let mut expected_counts = vec![0u32; rule_count];

        for rule in rules {
            let id = rule.definition_index as RuleId;
            expected_counts[rule.definition_index] = rule.expected_count();

            for condition in &rule.conditions {
                if condition.negated {
                    continue;
                }
                let part = condition.part.as_index();
                match condition.operator {
                    Operator::Equals => {
                        equals[part].entry(condition.value.clone()).or_default().push(id);
                        has_equals[part] = true;
                    }
                    Operator::StartsWith => {
                        starts_with[part].insert(&condition.value, id);
                        has_starts_with[part] = true;
                    }
                    Operator::EndsWith => {
                        let reversed: String = condition.value.chars().rev().collect();
                        ends_with[part].insert(&reversed, id);
                        has_ends_with[part] = true;
                    }
                    Operator::Contains => {
                        contains[part].insert(&condition.value, id);
                        has_contains[part] = true;
                    }
                }
            }
        }

        for automaton in &mut contains {
            automaton.build();
        }

        tracing::debug!(rule_count, "rule index compiled");

        Self {
            equals,
            starts_with,
            ends_with,
            contains,
            has_equals,
            has_starts_with,
            has_ends_with,
            has_contains,
            expected_counts: Arc::from(expected_counts.into_boxed_slice()),
        }
    }

    pub fn rule_count(&self) -> usize {
        self.expected_counts.len()
    }

    pub fn expected_counts(&self) -> &Arc<[u32]> {
        &self.expected_counts
    }

    /// Query the index for `url`, accumulating per-rule satisfaction
    /// counters into this thread's candidate buffer, then hand the buffer
    /// to `f`. The buffer is reset before use and left in its post-query
    /// state for the duration of the callback only.
    pub fn query_candidates<R>(&self, url: &ParsedUrl, f: impl FnOnce(&CandidateBuffer) -> R) -> R {
        BUFFER_CACHE.with(|cache| {
            let mut slot = cache.borrow_mut();
            let buffer = slot.get_or_insert_with(|| CandidateBuffer::new(Arc::clone(&self.expected_counts)));
            buffer.rebind(Arc::clone(&self.expected_counts));
            buffer.reset();

            for part in UrlPart::ALL {
                let idx = part.as_index();
                let value = url.part(part);

                if self.has_equals[idx] {
                    if let Some(ids) = self.equals[idx].get(value) {
                        for &id in ids {
                            buffer.increment(id);
                        }
                    }
                }

                if self.has_starts_with[idx] {
                    self.starts_with[idx].find_prefixes_of(value, &mut |id| buffer.increment(id));
                }

                if self.has_ends_with[idx] {
                    REVERSE_SCRATCH.with(|scratch| {
                        let mut scratch = scratch.borrow_mut();
                        scratch.clear();
                        scratch.extend(value.chars().rev());
                        self.ends_with[idx].find_prefixes_of(&scratch, &mut |id| buffer.increment(id));
                    });
                }

                if self.has_contains[idx] {
                    SEEN_SCRATCH.with(|seen| {
                        let mut seen = seen.borrow_mut();
                        seen.clear();
                        self.contains[idx].search(value, &mut |id| {
                            if seen.insert(id) {
                                buffer.increment(id);
                            }
                        });
                    });
                }
            }

            f(buffer)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Condition;

    fn rule(idx: usize, conditions: Vec<Condition>) -> Rule {
        Rule::new(format!("r{idx}"), 0, conditions, format!("R{idx}"), idx)
    }

    fn url(host: &str, path: &str, file: &str, query: &str) -> ParsedUrl {
        ParsedUrl { host: host.into(), path: path.into(), file: file.into(), query: query.into() }
    }

    #[test]
    fn counter_equality_matches_every_condition() {
        let rules = vec![rule(
            0,
            vec![
                Condition::new(UrlPart::Host, Operator::EndsWith, ".ca", false),
                Condition::new(UrlPart::Path, Operator::Contains, "sport", false),
            ],
        )];
        let index = RuleIndex::new(&rules);

        let matching = url("shop.example.ca", "/category/sport/items", "items", "");
        index.query_candidates(&matching, |buf| {
            assert!(buf.all_satisfied(0));
        });

        let partial = url("shop.example.ca", "/category/other", "other", "");
        index.query_candidates(&partial, |buf| {
            assert!(buf.is_candidate(0));
            assert!(!buf.all_satisfied(0));
        });
    }

    #[test]
    fn all_negated_rule_never_touches_buffer() {
        let rules =
            vec![rule(0, vec![Condition::new(UrlPart::Path, Operator::StartsWith, "/admin", true)])];
        let index = RuleIndex::new(&rules);
        let any_url = url("x.com", "/admin/panel", "panel", "");
        index.query_candidates(&any_url, |buf| {
            assert!(!buf.is_candidate(0));
            assert!(buf.all_satisfied(0));
        });
    }

    #[test]
    fn expected_counts_reflect_non_negated_conditions() {
        let rules = vec![rule(
            0,
            vec![
                Condition::new(UrlPart::Host, Operator::Equals, "a.com", false),
                Condition::new(UrlPart::Path, Operator::StartsWith, "/x", true),
            ],
        )];
        let index = RuleIndex::new(&rules);
        assert_eq!(index.rule_count(), 1);
        assert_eq!(index.expected_counts().as_ref(), &[1]);
    }

    #[test]
    fn contains_counts_each_rule_at_most_once_per_query() {
        // "a" occurs three times in "/aaa", but the rule's expected count is
        // 1 (one non-negated condition); repeated occurrences of the same
        // pattern within a single part must not drive the counter past it.
        let rules = vec![rule(0, vec![Condition::new(UrlPart::Path, Operator::Contains, "a", false)])];
        let index = RuleIndex::new(&rules);

        let repeated = url("x.com", "/aaa", "aaa", "");
        index.query_candidates(&repeated, |buf| {
            assert!(buf.is_candidate(0));
            assert!(buf.all_satisfied(0));
        });
    }

    #[test]
    fn empty_index_never_panics() {
        let index = RuleIndex::new(&[]);
        let any_url = url("x.com", "/", "", "");
        index.query_candidates(&any_url, |_buf| {});
    }

    #[test]
    fn reset_reused_across_queries_in_same_thread() {
        let rules = vec![rule(0, vec![Condition::new(UrlPart::Host, Operator::Equals, "a.com", false)])];
        let index = RuleIndex::new(&rules);

        index.query_candidates(&url("a.com", "", "", ""), |buf| assert!(buf.is_candidate(0)));
        index.query_candidates(&url("b.com", "", "", ""), |buf| assert!(!buf.is_candidate(0)));
    }
}
