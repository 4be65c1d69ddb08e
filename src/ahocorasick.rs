//! Aho-Corasick compilation layer over a [`Trie`] backend.
//!
//! Adds sidecar `fail`/`report` links computed by a breadth-first walk,
//! so that scanning text costs `O(N)` regardless of how many patterns
//! are registered, instead of the `O(N*L)` a bare trie walk pays by
//! re-running `match_prefix` at every offset (see [`crate::trie_matcher`]).
//!
//! Grounded on `original_source/src/balgo/ac/aho_corasick.h`'s `Compile`,
//! `FindFail`, `FindReport` and the `Match` semantics they imply: at a
//! scanned position, emit the current node's value if it is terminal,
//! then walk `report` links emitting each ancestor's value. This is
//! deliberately *not* the alternate reading present in the original's
//! other `Match` body (`mpm/aho_corasick.h`'s `DoMatch`), which
//! double-counts the current node.

use std::collections::VecDeque;
use std::marker::PhantomData;

use crate::error::TrieError;
use crate::symbol::Symbol;
use crate::trie::Trie;
use crate::Sink;

/// A pattern match produced by [`AhoCorasick::find_overlapping_iter`] or
/// [`AhoCorasick::scan`]: a stored value together with the inclusive
/// offset, into the scanned input, of the last symbol it matched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match<V> {
    value: V,
    position: usize,
}

impl<V: Copy> Match<V> {
    #[inline]
    pub fn value(&self) -> V {
        self.value
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }
}

/// Wraps a trie backend `T` with Aho-Corasick `fail`/`report` links,
/// computed once by [`AhoCorasick::compile`].
pub struct AhoCorasick<'p, T: Trie<'p>> {
    trie: T,
    fail: Vec<T::Id>,
    report: Vec<T::Id>,
    compiled: bool,
    _marker: PhantomData<&'p ()>,
}

impl<'p, T: Trie<'p>> AhoCorasick<'p, T> {
    pub fn new(trie: T) -> Self {
        AhoCorasick {
            trie,
            fail: Vec::new(),
            report: Vec::new(),
            compiled: false,
            _marker: PhantomData,
        }
    }

    pub fn trie(&self) -> &T {
        &self.trie
    }

    pub fn insert(&mut self, pattern: &'p [T::Sym], value: T::Value) -> Result<bool, TrieError> {
        self.trie.insert(pattern, value)
    }

    /// Build the underlying trie if needed, then compute `fail`/`report`
    /// links by a breadth-first walk. Idempotent: only the first call
    /// does anything and returns `true`.
    pub fn compile(&mut self) -> bool {
        if self.compiled {
            return false;
        }
        if !self.trie.is_built() {
            self.trie.build();
        }

        let root = self.trie.root();
        let n = self.trie.num_nodes();
        self.fail = vec![root; n];
        self.report = vec![T::Id::NULL; n];

        log::debug!("compiling Aho-Corasick links over {n} nodes");

        let mut queue = VecDeque::new();
        self.trie.for_each_child(root, &mut |_label, child| {
            queue.push_back(child);
        });

        let mut compiled_nodes = 0usize;
        while let Some(node) = queue.pop_front() {
            let node_fail = self.fail[node.to_usize()];
            self.report[node.to_usize()] = if self.trie.is_final(node_fail) {
                node_fail
            } else {
                self.report[node_fail.to_usize()]
            };

            let mut kids: Vec<(T::Sym, T::Id)> = Vec::new();
            self.trie
                .for_each_child(node, &mut |label, child| kids.push((label, child)));

            for (label, child) in kids {
                let mut f = node_fail;
                let mut next = self.trie.child(f, label);
                while next == T::Id::NULL && f != root {
                    f = self.fail[f.to_usize()];
                    next = self.trie.child(f, label);
                }
                if next == T::Id::NULL {
                    next = root;
                }
                self.fail[child.to_usize()] = next;
                queue.push_back(child);
            }
            compiled_nodes += 1;
        }

        log::trace!("Aho-Corasick compile visited {compiled_nodes} non-root nodes");
        self.compiled = true;
        true
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled
    }

    fn step(&self, state: T::Id, sym: T::Sym) -> T::Id {
        let root = self.trie.root();
        let mut s = state;
        loop {
            let c = self.trie.child(s, sym);
            if c != T::Id::NULL {
                return c;
            }
            if s == root {
                return root;
            }
            s = self.fail[s.to_usize()];
        }
    }

    /// Scan `input` once, reporting every stored pattern that ends at
    /// every position, in ascending position order; within one
    /// position, the longest matching suffix is reported first, then
    /// shorter suffixes via the `report` chain.
    pub fn find_overlapping_iter<'a, 'b: 'a>(
        &'a self,
        input: &'b [T::Sym],
    ) -> FindOverlappingIter<'a, 'b, 'p, T> {
        FindOverlappingIter {
            ac: self,
            input,
            pos: 0,
            last_offset: 0,
            state: self.trie.root(),
            pending: T::Id::NULL,
        }
    }

    /// Same traversal as [`AhoCorasick::find_overlapping_iter`], emitting
    /// into `sink` instead of yielding an iterator. Returns the number of
    /// matches reported.
    pub fn scan(&self, input: &[T::Sym], sink: &mut dyn Sink<T::Value>) -> usize {
        if !self.compiled {
            return 0;
        }
        let mut count = 0;
        for m in self.find_overlapping_iter(input) {
            sink.emit(m.value(), m.position());
            count += 1;
        }
        count
    }
}

/// Iterator over overlapping matches produced by
/// [`AhoCorasick::find_overlapping_iter`].
pub struct FindOverlappingIter<'a, 'b, 'p, T: Trie<'p>> {
    ac: &'a AhoCorasick<'p, T>,
    input: &'b [T::Sym],
    pos: usize,
    last_offset: usize,
    state: T::Id,
    pending: T::Id,
}

impl<'a, 'b, 'p, T: Trie<'p>> Iterator for FindOverlappingIter<'a, 'b, 'p, T> {
    type Item = Match<T::Value>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.pending != T::Id::NULL {
                let node = self.pending;
                self.pending = self.ac.report[node.to_usize()];
                if let Some(value) = self.ac.trie.value_of(node) {
                    return Some(Match {
                        value,
                        position: self.last_offset,
                    });
                }
                continue;
            }

            if !self.ac.compiled || self.pos >= self.input.len() {
                return None;
            }

            let sym = self.input[self.pos];
            self.state = self.ac.step(self.state, sym);
            self.last_offset = self.pos;
            self.pos += 1;

            self.pending = if self.ac.trie.is_final(self.state) {
                self.state
            } else {
                self.ac.report[self.state.to_usize()]
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node_id::NodeId as _;
    use crate::trie::double_array::DoubleArrayTrie;
    use crate::ValueCollector;

    fn build_ac(
        patterns: &[(&'static str, u32)],
    ) -> AhoCorasick<'static, DoubleArrayTrie<'static, u8, u32, u32>> {
        let mut ac = AhoCorasick::new(DoubleArrayTrie::new());
        for &(p, v) in patterns {
            ac.insert(p.as_bytes(), v).unwrap();
        }
        ac.compile();
        ac
    }

    /// `P = ["a", "bc", "abc", "abcde", "cd"]`, values `0..4`, used by
    /// S2/S3/S4.
    fn build_s2_s4_ac() -> AhoCorasick<'static, DoubleArrayTrie<'static, u8, u32, u32>> {
        build_ac(&[("a", 0), ("bc", 1), ("abc", 2), ("abcde", 3), ("cd", 4)])
    }

    #[test]
    fn s2_ac_scan_of_a() {
        let ac = build_s2_s4_ac();
        let matches: Vec<(u32, usize)> = ac
            .find_overlapping_iter(b"a")
            .map(|m| (m.value(), m.position()))
            .collect();
        assert_eq!(matches, vec![(0, 0)]);
    }

    #[test]
    fn s3_ac_scan_of_abc() {
        let ac = build_s2_s4_ac();
        let matches: Vec<(u32, usize)> = ac
            .find_overlapping_iter(b"abc")
            .map(|m| (m.value(), m.position()))
            .collect();
        assert_eq!(matches, vec![(0, 0), (2, 2), (1, 2)]);
    }

    #[test]
    fn s4_ac_scan_of_ababcdef() {
        let ac = build_s2_s4_ac();
        let mut values = Vec::new();
        let count = ac.scan(b"ababcdef", &mut ValueCollector { values: &mut values });
        assert_eq!(count, 6);
        // a@0, a@2, abc@4 (then bc@4 via report), cd@5, abcde@6.
        assert_eq!(values, vec![0, 0, 2, 1, 4, 3]);
    }

    #[test]
    fn s4_overlapping_scan_order() {
        // "she", "he", "hers", "his" over "ushers" per the classic
        // Aho-Corasick worked example — a second pattern set/text pair
        // exercising the same ordering contract as S4.
        let ac = build_ac(&[("he", 0), ("she", 1), ("his", 2), ("hers", 3)]);
        let matches: Vec<(u32, usize)> = ac
            .find_overlapping_iter(b"ushers")
            .map(|m| (m.value(), m.position()))
            .collect();

        // "she" ends at index 3, "he" ends at index 3 too (reported
        // after "she" via the report chain), "hers" ends at index 5.
        assert_eq!(matches, vec![(1, 3), (0, 3), (3, 5)]);
    }

    #[test]
    fn s5_trie_matcher_same_multiset_different_order() {
        use crate::trie_matcher::TrieMatcher;

        let mut tm = TrieMatcher::new(DoubleArrayTrie::<u8, u32, u32>::new());
        tm.trie_mut().insert(b"he", 0).unwrap();
        tm.trie_mut().insert(b"she", 1).unwrap();
        tm.trie_mut().insert(b"his", 2).unwrap();
        tm.trie_mut().insert(b"hers", 3).unwrap();
        tm.trie_mut().build();

        let mut tm_values = Vec::new();
        tm.scan(b"ushers", &mut ValueCollector { values: &mut tm_values });

        let ac = build_ac(&[("he", 0), ("she", 1), ("his", 2), ("hers", 3)]);
        let mut ac_values = Vec::new();
        ac.scan(b"ushers", &mut ValueCollector { values: &mut ac_values });

        let mut sorted_tm = tm_values.clone();
        let mut sorted_ac = ac_values.clone();
        sorted_tm.sort();
        sorted_ac.sort();
        assert_eq!(sorted_tm, sorted_ac, "same multiset of matches");
        assert_ne!(
            tm_values, ac_values,
            "trie-MPM and AC scan must differ in emission order (S4 vs S5)"
        );
    }

    #[test]
    fn no_matches_when_absent() {
        let ac = build_ac(&[("xyz", 0)]);
        let mut values = Vec::new();
        let count = ac.scan(b"abcdef", &mut ValueCollector { values: &mut values });
        assert_eq!(count, 0);
        assert!(values.is_empty());
    }

    #[test]
    fn scan_before_compile_is_empty() {
        let mut ac: AhoCorasick<DoubleArrayTrie<u8, u32, u32>> = AhoCorasick::new(DoubleArrayTrie::new());
        ac.insert(b"a", 1).unwrap();
        let mut values = Vec::new();
        let count = ac.scan(b"a", &mut ValueCollector { values: &mut values });
        assert_eq!(count, 0);
    }

    #[test]
    fn single_character_patterns() {
        let ac = build_ac(&[("a", 0), ("b", 1)]);
        let mut values = Vec::new();
        let count = ac.scan(b"aabba", &mut ValueCollector { values: &mut values });
        assert_eq!(count, 5);
        assert_eq!(values, vec![0, 0, 1, 1, 0]);
    }

    #[test]
    fn fail_links_are_well_founded() {
        // Every fail-chain must reach root in a bounded number of hops,
        // with no cycle that doesn't pass through root itself.
        let ac = build_ac(&[("he", 0), ("she", 1), ("his", 2), ("hers", 3)]);
        let root = ac.trie.root();
        for node in 1..ac.trie.num_nodes() {
            let node = u32::from_usize(node);
            let mut seen = std::collections::HashSet::new();
            let mut cur = node;
            loop {
                if cur == root {
                    break;
                }
                assert!(seen.insert(cur), "fail-link cycle not involving root");
                cur = ac.fail[cur.to_usize()];
            }
        }
    }
}
