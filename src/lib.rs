//! Indexed URL rule-matching engine.
//!
//! Given a declarative rule set (priority, a conjunction of conditions on
//! one of four URL parts, and a result string), [`RuleEngine`] answers
//! "which rule wins for this URL?" in time sublinear in the rule count by
//! pre-compiling conditions into per-operator indexes and accumulating
//! per-rule satisfaction counters during a single pass over the URL's
//! parts, rather than testing every rule's every condition in turn.
//!
//! ```
//! use rule_engine::{Condition, Operator, ParsedUrl, Rule, RuleEngine, UrlPart};
//!
//! let rules = vec![Rule::new(
//!     "canada-sport",
//!     10,
//!     vec![
//!         Condition::new(UrlPart::Host, Operator::EndsWith, ".ca", false),
//!         Condition::new(UrlPart::Path, Operator::Contains, "sport", false),
//!     ],
//!     "Canada Sport",
//!     0,
//! )];
//! let engine = RuleEngine::new(rules);
//!
//! let url = ParsedUrl {
//!     host: "shop.example.ca".into(),
//!     path: "/category/sport/items".into(),
//!     file: "items".into(),
//!     query: String::new(),
//! };
//! assert_eq!(engine.evaluate(&url), Some("Canada Sport"));
//! ```

mod automaton;
mod buffer;
mod engine;
mod error;
mod index;
mod loader;
mod types;
pub mod url;

pub use engine::RuleEngine;
pub use error::RuleLoadError;
pub use loader::{load_rules_from_path, load_rules_from_str};
pub use types::{Condition, Operator, ParsedUrl, Rule, RuleId, UrlPart};

/// Evaluate a single URL and return the literal output the CLI would print
/// after the arrow: the matching rule's result, `"NO_MATCH"`, or — for a URL
/// the parser could not decode — `"INVALID_URL"`.
pub fn classify(engine: &RuleEngine, raw_url: &str) -> String {
    match url::parse_url(raw_url) {
        None => "INVALID_URL".to_string(),
        Some(parsed) => engine.evaluate(&parsed).map(str::to_string).unwrap_or_else(|| "NO_MATCH".to_string()),
    }
}

#[cfg(test)]
mod differential_tests {
    use super::*;
    use crate::types::{Condition, Operator, Rule, UrlPart};

    /// Naive reference evaluator: iterate rules in priority order, test
    /// each condition by direct string operator. No indexing at all.
    fn naive_evaluate<'a>(rules: &'a [Rule], url: &ParsedUrl) -> Option<&'a str> {
        let mut ordered: Vec<&Rule> = rules.iter().collect();
        ordered.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.definition_index.cmp(&b.definition_index)));
        for rule in ordered {
            if rule.conditions.iter().all(|c| c.holds(url)) {
                return Some(rule.result.as_str());
            }
        }
        None
    }

    fn rule(i: usize, priority: i64, conditions: Vec<Condition>, result: &str) -> Rule {
        Rule::new(format!("r{i}"), priority, conditions, result, i)
    }

    fn sample_urls() -> Vec<ParsedUrl> {
        let hosts = ["example.com", "shop.example.ca", "x.org", "special.com", ""];
        let paths = ["/", "/admin/panel", "/category/sport/items", "", "/a/b/index.html", "/aaa/ababab"];
        let files = ["", "panel", "items", "index.html"];
        let queries = ["", "x=1", "sport=true"];

        let mut urls = Vec::new();
        for host in hosts {
            for path in paths {
                for file in files {
                    for query in queries {
                        urls.push(ParsedUrl {
                            host: host.into(),
                            path: path.into(),
                            file: file.into(),
                            query: query.into(),
                        });
                    }
                }
            }
        }
        urls
    }

    #[test]
    fn indexed_engine_agrees_with_naive_evaluator() {
        let rules = vec![
            rule(0, 10, vec![Condition::new(UrlPart::Host, Operator::EndsWith, ".ca", false)], "CA"),
            rule(
                1,
                10,
                vec![
                    Condition::new(UrlPart::Host, Operator::EndsWith, ".com", false),
                    Condition::new(UrlPart::Path, Operator::StartsWith, "/admin", true),
                ],
                "COM-NOT-ADMIN",
            ),
            rule(2, 3, vec![Condition::new(UrlPart::File, Operator::EndsWith, ".html", false)], "HTML"),
            rule(
                3,
                3,
                vec![Condition::new(UrlPart::Path, Operator::Contains, "sport", false)],
                "SPORT",
            ),
            rule(4, 1, vec![Condition::new(UrlPart::Host, Operator::Equals, "special.com", false)], "SPECIAL"),
            rule(
                5,
                0,
                vec![Condition::new(UrlPart::Query, Operator::Equals, "", true)],
                "HAS-QUERY",
            ),
            rule(
                6,
                2,
                vec![Condition::new(UrlPart::Path, Operator::Contains, "a", false)],
                "HAS-A",
            ),
            rule(
                7,
                2,
                vec![Condition::new(UrlPart::Path, Operator::Contains, "ab", false)],
                "HAS-AB",
            ),
        ];
        let engine = RuleEngine::new(rules.clone());

        for url in sample_urls() {
            assert_eq!(engine.evaluate(&url), naive_evaluate(&rules, &url), "mismatch for {url:?}");
        }
    }

    #[test]
    fn repeated_substring_occurrence_still_matches() {
        let rules = vec![rule(
            0,
            0,
            vec![Condition::new(UrlPart::Path, Operator::Contains, "a", false)],
            "MATCH",
        )];
        let engine = RuleEngine::new(rules.clone());
        let url = ParsedUrl { host: "x.com".into(), path: "/aaa".into(), file: "aaa".into(), query: String::new() };
        assert_eq!(engine.evaluate(&url), naive_evaluate(&rules, &url));
        assert_eq!(engine.evaluate(&url), Some("MATCH"));
    }

    #[test]
    fn empty_rule_set_agrees() {
        let rules: Vec<Rule> = vec![];
        let engine = RuleEngine::new(rules.clone());
        for url in sample_urls() {
            assert_eq!(engine.evaluate(&url), naive_evaluate(&rules, &url));
        }
    }
}
