//! Candidate buffer: a per-thread accumulator tracking, for each rule, how
//! many of its non-negated conditions have matched during the current
//! query.
//!
//! `reset()` only has to zero the counters that were actually touched since
//! the last reset — tracked via a dirty list — turning reset from
//! `Θ(rule_count)` into `Θ(distinct rules touched)`. This matters because a
//! query typically touches far fewer than `rule_count` rules.

use std::sync::Arc;

use crate::types::RuleId;

/// Mutable, per-thread accumulator sized to the rule count of one
/// `RuleIndex`.
pub struct CandidateBuffer {
    counters: Vec<u32>,
    touched: Vec<bool>,
    dirty: Vec<RuleId>,
    expected: Arc<[u32]>,
}

impl CandidateBuffer {
    pub fn new(expected: Arc<[u32]>) -> Self {
        let rule_count = expected.len();
        Self {
            counters: vec![0; rule_count],
            touched: vec![false; rule_count],
            dirty: Vec::new(),
            expected,
        }
    }

    /// Re-point this buffer at a (possibly different) rule index's expected
    /// counts, clearing any leftover state. Cheap when reused against the
    /// same index (an `Arc` pointer comparison plus, if sizes differ, a
    /// reallocation); used by the thread-local cache when a new engine with
    /// the same rule count replaces a previous one.
    pub fn rebind(&mut self, expected: Arc<[u32]>) {
        if !Arc::ptr_eq(&self.expected, &expected) {
            let rule_count = expected.len();
            if self.counters.len() != rule_count {
                self.counters = vec![0; rule_count];
                self.touched = vec![false; rule_count];
                self.dirty.clear();
            } else {
                self.reset();
            }
            self.expected = expected;
        }
    }

    /// Zero every counter touched since the last reset, in O(touched).
    pub fn reset(&mut self) {
        for &id in &self.dirty {
            let idx = id as usize;
            self.counters[idx] = 0;
            self.touched[idx] = false;
        }
        self.dirty.clear();
    }

    /// Add one to `counter[id]`, recording `id` in the dirty set on its
    /// first touch since the last reset.
    #[inline]
    pub fn increment(&mut self, id: RuleId) {
        let idx = id as usize;
        if !self.touched[idx] {
            self.touched[idx] = true;
            self.dirty.push(id);
        }
        self.counters[idx] += 1;
    }

    #[inline]
    pub fn is_candidate(&self, id: RuleId) -> bool {
        self.counters[id as usize] > 0
    }

    #[inline]
    pub fn all_satisfied(&self, id: RuleId) -> bool {
        self.counters[id as usize] == self.expected[id as usize]
    }
}
