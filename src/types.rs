//! Core domain types for the rule-matching engine.

use std::fmt;

/// One of the four named substrings extracted from a parsed URL.
///
/// The variant count is fixed at four; parts are addressed by a dense
/// ordinal (`as_index`) everywhere on the hot path instead of by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlPart {
    Host,
    Path,
    File,
    Query,
}

impl UrlPart {
    /// All four parts, in the fixed query order (host, path, file, query).
    pub const ALL: [UrlPart; 4] = [UrlPart::Host, UrlPart::Path, UrlPart::File, UrlPart::Query];

    /// Number of distinct parts. Used to size per-part index arrays.
    pub const COUNT: usize = 4;

    /// Dense ordinal in `0..UrlPart::COUNT`.
    #[inline]
    pub fn as_index(self) -> usize {
        match self {
            UrlPart::Host => 0,
            UrlPart::Path => 1,
            UrlPart::File => 2,
            UrlPart::Query => 3,
        }
    }
}

impl fmt::Display for UrlPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UrlPart::Host => "host",
            UrlPart::Path => "path",
            UrlPart::File => "file",
            UrlPart::Query => "query",
        };
        f.write_str(s)
    }
}

/// One of the four string operators a condition may apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equals,
    Contains,
    StartsWith,
    EndsWith,
}

impl Operator {
    pub const ALL: [Operator; 4] = [
        Operator::Equals,
        Operator::Contains,
        Operator::StartsWith,
        Operator::EndsWith,
    ];
    pub const COUNT: usize = 4;

    #[inline]
    pub fn as_index(self) -> usize {
        match self {
            Operator::Equals => 0,
            Operator::Contains => 1,
            Operator::StartsWith => 2,
            Operator::EndsWith => 3,
        }
    }

    /// Direct evaluation of this operator against a haystack/needle pair.
    ///
    /// This is the reference semantics used both by the negated-condition
    /// verification path in the rule engine and by the naive evaluator used
    /// in differential tests.
    #[inline]
    pub fn matches(self, haystack: &str, needle: &str) -> bool {
        match self {
            Operator::Equals => haystack == needle,
            Operator::Contains => haystack.contains(needle),
            Operator::StartsWith => haystack.starts_with(needle),
            Operator::EndsWith => haystack.ends_with(needle),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operator::Equals => "equals",
            Operator::Contains => "contains",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
        };
        f.write_str(s)
    }
}

/// A single (part, operator, value, negated) test against a parsed URL.
///
/// Conditions are value objects: two conditions with equal fields are
/// interchangeable, and duplicate conditions within a rule are permitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    pub part: UrlPart,
    pub operator: Operator,
    pub value: String,
    pub negated: bool,
}

impl Condition {
    pub fn new(part: UrlPart, operator: Operator, value: impl Into<String>, negated: bool) -> Self {
        Self { part, operator, value: value.into(), negated }
    }

    /// Evaluate this condition directly against a parsed URL, honoring
    /// negation. Used for negated-condition verification and by the naive
    /// reference evaluator; never called on the indexed hot path for
    /// non-negated conditions.
    pub fn holds(&self, url: &ParsedUrl) -> bool {
        let haystack = url.part(self.part);
        let raw = self.operator.matches(haystack, &self.value);
        if self.negated {
            !raw
        } else {
            raw
        }
    }
}

/// A conjunction of conditions, a priority, and a result string.
///
/// `definition_index` is assigned at construction time (0..N-1 in
/// presentation order) and is the tie-breaker when two rules share a
/// priority: lower definition index wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: String,
    pub priority: i64,
    pub conditions: Vec<Condition>,
    pub result: String,
    pub definition_index: usize,
}

impl Rule {
    pub fn new(
        name: impl Into<String>,
        priority: i64,
        conditions: Vec<Condition>,
        result: impl Into<String>,
        definition_index: usize,
    ) -> Self {
        Self {
            name: name.into(),
            priority,
            conditions,
            result: result.into(),
            definition_index,
        }
    }

    /// True iff every condition of this rule is negated, i.e. the rule
    /// contributes nothing to any operator index and must be considered
    /// unconditionally during the priority scan.
    pub fn all_negated(&self) -> bool {
        self.conditions.iter().all(|c| c.negated)
    }

    /// Number of non-negated conditions — the candidate buffer's expected
    /// count for this rule.
    pub fn expected_count(&self) -> u32 {
        self.conditions.iter().filter(|c| !c.negated).count() as u32
    }
}

/// A dense integer identifying a rule within a `RuleIndex`, assigned in
/// `0..N-1`. The mapping rule -> id is injective and stable for the
/// lifetime of the index.
pub type RuleId = u32;

/// A URL decomposed into its four matchable parts.
///
/// Host is lowercased, file is the last path segment (empty if the path is
/// empty or ends in `/`), query excludes the leading `?`. Absent parts are
/// the empty string, never null.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedUrl {
    pub host: String,
    pub path: String,
    pub file: String,
    pub query: String,
}

impl ParsedUrl {
    #[inline]
    pub fn part(&self, part: UrlPart) -> &str {
        match part {
            UrlPart::Host => &self.host,
            UrlPart::Path => &self.path,
            UrlPart::File => &self.file,
            UrlPart::Query => &self.query,
        }
    }
}
