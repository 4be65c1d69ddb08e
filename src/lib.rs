//! Multi-pattern string matching over compact, array-backed tries.
//!
//! Two trie backends ([`trie::double_array::DoubleArrayTrie`] and
//! [`trie::ternary::TernaryTrie`]) share one [`trie::Trie`] contract, and
//! can each be driven two ways: directly, by re-running
//! [`trie::Trie::match_prefix`] at every input offset
//! ([`trie_matcher::TrieMatcher`]), or compiled into an Aho-Corasick
//! automaton with `fail`/`report` links for a single linear scan
//! ([`ahocorasick::AhoCorasick`]). [`MultiPatternMatcher`] is a thin
//! facade over both.
//!
//! Every structure here goes through the same two-phase lifecycle:
//! insert patterns (borrowing their bytes), `build`/`compile` once, then
//! run read-only matches against it.
//!
//! ```
//! use balgo_match::ahocorasick::AhoCorasick;
//! use balgo_match::trie::double_array::DoubleArrayTrie;
//! use balgo_match::ValueCollector;
//!
//! let mut ac = AhoCorasick::new(DoubleArrayTrie::<u8, u32, u32>::new());
//! ac.insert(b"he", 0).unwrap();
//! ac.insert(b"she", 1).unwrap();
//! ac.insert(b"his", 2).unwrap();
//! ac.insert(b"hers", 3).unwrap();
//! ac.compile();
//!
//! let mut values = Vec::new();
//! ac.scan(b"ushers", &mut ValueCollector { values: &mut values });
//! assert_eq!(values, vec![1, 0, 3]);
//! ```

pub mod ahocorasick;
pub mod error;
pub mod node_id;
pub mod symbol;
pub mod trie;
pub mod trie_matcher;

use ahocorasick::AhoCorasick;
use error::TrieError;
use trie::Trie;
use trie_matcher::TrieMatcher;

/// Callback invoked once per match: the stored value and the position
/// at which it was found (an end offset for a scan; an end offset
/// within a single `match_prefix` call).
pub trait Sink<V> {
    fn emit(&mut self, value: V, position: usize);
}

/// A [`Sink`] that discards everything. Useful when a caller only cares
/// about the match count (`match_prefix`'s and `scan`'s return values).
pub struct NullSink;

impl<V> Sink<V> for NullSink {
    #[inline]
    fn emit(&mut self, _value: V, _position: usize) {}
}

/// A [`Sink`] that appends every matched value, in emission order, to a
/// caller-owned `Vec`. Positions are discarded; use a custom `Sink` impl
/// if they're needed.
pub struct ValueCollector<'a, V> {
    pub values: &'a mut Vec<V>,
}

impl<'a, V> Sink<V> for ValueCollector<'a, V> {
    #[inline]
    fn emit(&mut self, value: V, _position: usize) {
        self.values.push(value);
    }
}

enum Strategy<'p, T: Trie<'p>> {
    Direct(TrieMatcher<'p, T>),
    Compiled(AhoCorasick<'p, T>),
}

/// Thin facade over [`trie_matcher::TrieMatcher`] and
/// [`ahocorasick::AhoCorasick`]: pick a trie backend and a scan strategy
/// at construction time, then drive both through one API.
///
/// ```
/// use balgo_match::trie::double_array::DoubleArrayTrie;
/// use balgo_match::MultiPatternMatcher;
///
/// let mut m = MultiPatternMatcher::compiled(DoubleArrayTrie::<u8, u32, u32>::new());
/// m.insert(b"foo", 123).unwrap();
/// m.insert(b"bar", 456).unwrap();
/// m.build();
/// assert_eq!(m.match_exact(b"foo"), Some(123));
/// ```
pub struct MultiPatternMatcher<'p, T: Trie<'p>> {
    strategy: Strategy<'p, T>,
}

impl<'p, T: Trie<'p>> MultiPatternMatcher<'p, T> {
    /// Scan strategy: re-run `match_prefix` at every offset. No compile
    /// step; cheaper to set up for small pattern sets or one-off scans.
    pub fn direct(trie: T) -> Self {
        MultiPatternMatcher {
            strategy: Strategy::Direct(TrieMatcher::new(trie)),
        }
    }

    /// Scan strategy: compile Aho-Corasick `fail`/`report` links for a
    /// single linear-time scan. Pays the compile cost once at `build`.
    pub fn compiled(trie: T) -> Self {
        MultiPatternMatcher {
            strategy: Strategy::Compiled(AhoCorasick::new(trie)),
        }
    }

    pub fn insert(&mut self, pattern: &'p [T::Sym], value: T::Value) -> Result<bool, TrieError> {
        match &mut self.strategy {
            Strategy::Direct(m) => m.trie_mut().insert(pattern, value),
            Strategy::Compiled(m) => m.insert(pattern, value),
        }
    }

    /// Builds the trie and, for the compiled strategy, the Aho-Corasick
    /// links. Idempotent per the underlying `Trie`/`AhoCorasick` contract.
    pub fn build(&mut self) -> bool {
        match &mut self.strategy {
            Strategy::Direct(m) => m.trie_mut().build(),
            Strategy::Compiled(m) => m.compile(),
        }
    }

    pub fn match_exact(&self, input: &[T::Sym]) -> Option<T::Value> {
        match &self.strategy {
            Strategy::Direct(m) => m.trie().match_exact(input),
            Strategy::Compiled(m) => m.trie().match_exact(input),
        }
    }

    /// Scan `input`, emitting every match into `sink`. Ordering differs
    /// between strategies (see the [`ahocorasick`] and [`trie_matcher`]
    /// module docs) but the multiset of matches is the same.
    pub fn scan(&self, input: &[T::Sym], sink: &mut dyn Sink<T::Value>) -> usize {
        match &self.strategy {
            Strategy::Direct(m) => m.scan(input, sink),
            Strategy::Compiled(m) => m.scan(input, sink),
        }
    }

    pub fn stats(&self) -> String {
        match &self.strategy {
            Strategy::Direct(m) => m.trie().stats(),
            Strategy::Compiled(m) => m.trie().stats(),
        }
    }
}
