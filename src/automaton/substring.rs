//! Substring automaton: an Aho–Corasick DFA answering "which inserted
//! patterns occur anywhere in input X?" in O(|X|), with no failure-link
//! chasing at search time.
//!
//! Build proceeds in four phases: (a) insert patterns as a trie, (b)
//! initialize depth-one failure links and fill the root's missing ASCII
//! transitions with self-loops, (c) compute all other failure links by BFS
//! while merging output sets along the way, (d) walk states in BFS order a
//! second time and complete every missing transition by inheriting from the
//! failure link's (already-completed) transition — collapsing the failure
//! chain into a single goto table. After phase (d), `search` is a single
//! table lookup per character.

use std::collections::{HashMap, VecDeque};

const ASCII_SLOTS: usize = 128;
const ROOT: u32 = 0;

struct BuildState {
    children: HashMap<char, u32>,
    fail: u32,
    output: Vec<usize>,
}

impl BuildState {
    fn new() -> Self {
        Self { children: HashMap::new(), fail: ROOT, output: Vec::new() }
    }
}

struct CompiledState<T> {
    ascii: Box<[u32; ASCII_SLOTS]>,
    extended: Option<HashMap<char, u32>>,
    output: Box<[T]>,
}

impl<T> CompiledState<T> {
    #[inline]
    fn transition(&self, ch: char) -> u32 {
        if (ch as u32) < ASCII_SLOTS as u32 {
            self.ascii[ch as usize]
        } else {
            self.extended.as_ref().and_then(|m| m.get(&ch).copied()).unwrap_or(ROOT)
        }
    }
}

/// Build-time trie; consumed by `build()` into the flattened, failure-link
/// free search structure.
pub struct SubstringAutomaton<T> {
    build: Vec<BuildState>,
    compiled: Vec<CompiledState<T>>,
    pattern_tags: Vec<T>,
    empty_tags: Vec<T>,
    built: bool,
}

impl<T: Copy> SubstringAutomaton<T> {
    pub fn new() -> Self {
        Self {
            build: vec![BuildState::new()],
            compiled: Vec::new(),
            pattern_tags: Vec::new(),
            empty_tags: Vec::new(),
            built: false,
        }
    }

    /// Insert `pattern` tagged with `tag`. Must be called before `build()`.
    ///
    /// # Panics
    /// Panics if called after `build()` — inserting into a built automaton
    /// is a programmer error, not a recoverable one.
    pub fn insert(&mut self, pattern: &str, tag: T) {
        assert!(!self.built, "SubstringAutomaton::insert called after build()");

        if pattern.is_empty() {
            self.empty_tags.push(tag);
            return;
        }

        let mut current = ROOT;
        for ch in pattern.chars() {
            current = match self.build[current as usize].children.get(&ch) {
                Some(&next) => next,
                None => {
                    let next = self.build.len() as u32;
                    self.build.push(BuildState::new());
                    self.build[current as usize].children.insert(ch, next);
                    next
                }
            };
        }
        let tag_id = self.pattern_tags.len();
        self.pattern_tags.push(tag);
        self.build[current as usize].output.push(tag_id);
    }

    /// Compile the trie into the failure-link-free DFA. Idempotent no-op if
    /// already built.
    pub fn build(&mut self) {
        if self.built {
            return;
        }

        // Phase (b): depth-one failure links point to root; fill root's
        // missing ASCII transitions with self-loops so later chasing never
        // needs to special-case "no transition defined at root".
        let root_children: Vec<(char, u32)> =
            self.build[ROOT as usize].children.iter().map(|(&c, &n)| (c, n)).collect();

        let mut queue: VecDeque<u32> = VecDeque::new();
        for &(_, child) in &root_children {
            self.build[child as usize].fail = ROOT;
            queue.push_back(child);
        }
        for code in 0..ASCII_SLOTS as u32 {
            let ch = char::from_u32(code).unwrap();
            self.build[ROOT as usize].children.entry(ch).or_insert(ROOT);
        }

        // Phase (c): BFS failure-link computation, merging output sets.
        let mut bfs_order: Vec<u32> = Vec::with_capacity(self.build.len());
        while let Some(s) = queue.pop_front() {
            bfs_order.push(s);
            let edges: Vec<(char, u32)> =
                self.build[s as usize].children.iter().map(|(&c, &n)| (c, n)).collect();
            for (c, t) in edges {
                let mut fs = self.build[s as usize].fail;
                let target = loop {
                    if let Some(&next) = self.build[fs as usize].children.get(&c) {
                        break next;
                    }
                    if fs == ROOT {
                        break ROOT;
                    }
                    fs = self.build[fs as usize].fail;
                };
                self.build[t as usize].fail = target;

                let inherited = self.build[target as usize].output.clone();
                self.build[t as usize].output.extend(inherited);

                queue.push_back(t);
            }
        }

        // Phase (d): second BFS-order walk, completing every transition by
        // inheriting from the (already-completed) failure target.
        let n = self.build.len();
        let mut ascii_tables: Vec<Box<[u32; ASCII_SLOTS]>> =
            (0..n).map(|_| Box::new([ROOT; ASCII_SLOTS])).collect();
        let mut extended_tables: Vec<HashMap<char, u32>> = (0..n).map(|_| HashMap::new()).collect();

        // Root is already fully completed from phase (b): its ascii map now
        // holds a transition (explicit or self-loop) for every ASCII code
        // point, and its extended map holds exactly its explicit non-ASCII
        // trie edges (no inheritance source for root itself).
        for code in 0..ASCII_SLOTS as u32 {
            let ch = char::from_u32(code).unwrap();
            ascii_tables[ROOT as usize][code as usize] = self.build[ROOT as usize].children[&ch];
        }
        for (&ch, &target) in &self.build[ROOT as usize].children {
            if (ch as u32) >= ASCII_SLOTS as u32 {
                extended_tables[ROOT as usize].insert(ch, target);
            }
        }

        for &s in &bfs_order {
            let fail_s = self.build[s as usize].fail;
            for code in 0..ASCII_SLOTS as u32 {
                let ch = char::from_u32(code).unwrap();
                let value = match self.build[s as usize].children.get(&ch) {
                    Some(&explicit) => explicit,
                    None => ascii_tables[fail_s as usize][code as usize],
                };
                ascii_tables[s as usize][code as usize] = value;
            }

            let mut extended = HashMap::new();
            for (&ch, &target) in &self.build[s as usize].children {
                if (ch as u32) >= ASCII_SLOTS as u32 {
                    extended.insert(ch, target);
                }
            }
            for (&ch, &target) in &extended_tables[fail_s as usize] {
                extended.entry(ch).or_insert(target);
            }
            extended_tables[s as usize] = extended;
        }

        self.compiled = (0..n)
            .map(|i| {
                let output: Box<[T]> = self.build[i]
                    .output
                    .iter()
                    .map(|&tag_id| self.pattern_tags[tag_id])
                    .collect();
                let extended = std::mem::take(&mut extended_tables[i]);
                CompiledState {
                    ascii: std::mem::replace(&mut ascii_tables[i], Box::new([ROOT; ASCII_SLOTS])),
                    extended: if extended.is_empty() { None } else { Some(extended) },
                    output,
                }
            })
            .collect();

        self.build.clear();
        self.build.shrink_to_fit();
        self.built = true;

        tracing::debug!(
            states = self.compiled.len(),
            patterns = self.pattern_tags.len(),
            "substring automaton compiled"
        );
    }

    /// Invoke `sink` once per (pattern, tag) occurrence for every inserted
    /// pattern that appears anywhere in `text`. Every inserted empty pattern
    /// fires exactly once per call, before any character is consumed.
    ///
    /// # Panics
    /// Panics if called before `build()`.
    pub fn search(&self, text: &str, sink: &mut dyn FnMut(T)) {
        assert!(self.built, "SubstringAutomaton::search called before build()");

        for &tag in &self.empty_tags {
            sink(tag);
        }

        if self.compiled.is_empty() {
            return;
        }

        let mut state = ROOT;
        for ch in text.chars() {
            state = self.compiled[state as usize].transition(ch);
            for &tag in self.compiled[state as usize].output.iter() {
                sink(tag);
            }
        }
    }
}

impl<T: Copy> Default for SubstringAutomaton<T> {
    fn default() -> Self {
        Self::new()
    }
}
