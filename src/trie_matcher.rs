//! Trie-based multi-pattern matcher: scans input by re-running
//! [`Trie::match_prefix`] starting at every offset, without compiling
//! Aho-Corasick `fail`/`report` links.
//!
//! `O(N*L)` where `N` is the input length and `L` the longest stored
//! pattern — worse asymptotically than [`crate::ahocorasick::AhoCorasick`],
//! but useful as a reference/oracle matcher and for pattern sets small
//! enough that compiling AC links isn't worth it. Grounded on
//! `original_source/src/balgo/mpm/trie_mpm.h`'s `DoMatch`: it reports the
//! same multiset of matches as the Aho-Corasick scan, in a different
//! (start-offset-major) order — see the S4/S5 distinction exercised in
//! `ahocorasick`'s tests.

use std::marker::PhantomData;

use crate::trie::Trie;
use crate::Sink;

pub struct TrieMatcher<'p, T: Trie<'p>> {
    trie: T,
    _marker: PhantomData<&'p ()>,
}

impl<'p, T: Trie<'p>> TrieMatcher<'p, T> {
    pub fn new(trie: T) -> Self {
        TrieMatcher {
            trie,
            _marker: PhantomData,
        }
    }

    pub fn trie(&self) -> &T {
        &self.trie
    }

    pub fn trie_mut(&mut self) -> &mut T {
        &mut self.trie
    }

    /// Re-run `match_prefix` starting at every offset in `input`, in
    /// ascending start-offset order; within one start offset, matches are
    /// reported in ascending length order, per `Trie::match_prefix`'s own
    /// contract. Returns the number of matches reported.
    pub fn scan(&self, input: &[T::Sym], sink: &mut dyn Sink<T::Value>) -> usize {
        let mut count = 0;
        for start in 0..input.len() {
            let mut offset_sink = OffsetSink { sink, start };
            count += self.trie.match_prefix(&input[start..], &mut offset_sink);
        }
        count
    }
}

struct OffsetSink<'a, V> {
    sink: &'a mut dyn Sink<V>,
    start: usize,
}

impl<'a, V> Sink<V> for OffsetSink<'a, V> {
    fn emit(&mut self, value: V, pos: usize) {
        self.sink.emit(value, self.start + pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trie::double_array::DoubleArrayTrie;
    use crate::trie::ternary::TernaryTrie;
    use crate::ValueCollector;

    #[test]
    fn s5_trie_matcher_scan_of_ababcdef() {
        // P = ["a","bc","abc","abcde","cd"], values 0..4, per spec.md's
        // own S4/S5 worked example.
        let mut tm = TrieMatcher::new(DoubleArrayTrie::<u8, u32, u32>::new());
        tm.trie_mut().insert(b"a", 0).unwrap();
        tm.trie_mut().insert(b"bc", 1).unwrap();
        tm.trie_mut().insert(b"abc", 2).unwrap();
        tm.trie_mut().insert(b"abcde", 3).unwrap();
        tm.trie_mut().insert(b"cd", 4).unwrap();
        tm.trie_mut().build();

        let mut values = Vec::new();
        let count = tm.scan(b"ababcdef", &mut ValueCollector { values: &mut values });
        assert_eq!(count, 6);
        // Start-offset-major, shortest-prefix-first per start: same
        // multiset as the AC scan's [0,0,2,1,4,3], different order.
        assert_eq!(values, vec![0, 0, 2, 3, 1, 4]);
    }

    #[test]
    fn s5_trie_matcher_position_major_order() {
        let mut tm = TrieMatcher::new(DoubleArrayTrie::<u8, u32, u32>::new());
        tm.trie_mut().insert(b"he", 0).unwrap();
        tm.trie_mut().insert(b"she", 1).unwrap();
        tm.trie_mut().insert(b"his", 2).unwrap();
        tm.trie_mut().insert(b"hers", 3).unwrap();
        tm.trie_mut().build();

        let mut values = Vec::new();
        let count = tm.scan(b"ushers", &mut ValueCollector { values: &mut values });
        assert_eq!(count, 3);
        // Start-offset-major: "she"/"he" both end at 3 but are found
        // from different start offsets (1 and 2), so "he" (the later
        // start offset) is reported after "she" here, matching
        // ascending-start-offset order rather than the AC scan's
        // terminal-then-ancestor order.
        assert_eq!(values, vec![1, 0, 3]);
    }

    #[test]
    fn empty_trie_matches_nothing() {
        let tm: TrieMatcher<DoubleArrayTrie<u8, u32, u32>> = TrieMatcher::new(DoubleArrayTrie::new());
        let mut values = Vec::new();
        let count = tm.scan(b"anything", &mut ValueCollector { values: &mut values });
        assert_eq!(count, 0);
        assert!(values.is_empty());
    }

    #[test]
    fn works_with_ternary_backend_too() {
        let mut tm = TrieMatcher::new(TernaryTrie::<u8, u32, u32>::new());
        tm.trie_mut().insert(b"a", 0).unwrap();
        tm.trie_mut().insert(b"ab", 1).unwrap();
        tm.trie_mut().build();

        let mut values = Vec::new();
        tm.scan(b"ab", &mut ValueCollector { values: &mut values });
        assert_eq!(values, vec![0, 1]);
    }
}
