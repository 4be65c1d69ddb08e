//! The shared trie surface (insert / build / match) implemented by both
//! the double-array trie and the ternary trie, plus the additional
//! child-iteration capability the Aho-Corasick compiler needs on top of
//! it.
//!
//! Usage, per either backend:
//! 1) [`Trie::insert`]
//! 2) [`Trie::build`]
//! 3) [`Trie::match_exact`] or [`Trie::match_prefix`]

pub mod double_array;
pub mod ternary;

use crate::error::TrieError;
use crate::node_id::NodeId;
use crate::symbol::Symbol;
use crate::Sink;

/// Common contract satisfied by every trie backend in this crate.
///
/// Parameterized by `'p`, the lifetime of the pattern byte buffers callers
/// insert: per §5's resource model, the insert phase borrows pattern bytes
/// rather than owning them, so callers must keep them alive through
/// `build`.
///
/// `insert`/`match_*` before the matching lifecycle stage are no-ops
/// rather than panics: `insert` after `build` returns `Ok(false)`,
/// `match_*` before `build` report zero matches.
pub trait Trie<'p> {
    type Sym: Symbol;
    type Value: Copy;
    type Id: NodeId;

    /// Root node id. Present even before any pattern is inserted.
    fn root(&self) -> Self::Id;

    /// Append one (pattern, value) pair to the pending set. Returns
    /// `Ok(false)` without modifying anything once the trie is built.
    /// Returns `Err` if the pattern contains the reserved null symbol.
    fn insert(&mut self, pattern: &'p [Self::Sym], value: Self::Value) -> Result<bool, TrieError>;

    /// Freeze the pending set and construct the trie. Idempotent: only
    /// the first call does anything and returns `true`; later calls
    /// return `false`.
    fn build(&mut self) -> bool;

    /// Whether `build` has completed.
    fn is_built(&self) -> bool;

    /// Look up a node's child along `label`, or `Id::NULL` if none.
    fn child(&self, parent: Self::Id, label: Self::Sym) -> Self::Id;

    /// Whether `node` terminates a stored pattern.
    fn is_final(&self, node: Self::Id) -> bool;

    /// The value stored at a terminal node, if any.
    fn value_of(&self, node: Self::Id) -> Option<Self::Value>;

    /// Visit every real (non-terminal-marker) child of `parent`, along
    /// with its incoming label, in ascending label order. Used by the
    /// Aho-Corasick compiler's breadth-first walk; not on the scan hot
    /// path.
    fn for_each_child(&self, parent: Self::Id, visit: &mut dyn FnMut(Self::Sym, Self::Id));

    /// True iff the full input equals some stored pattern.
    fn match_exact(&self, input: &[Self::Sym]) -> Option<Self::Value> {
        if !self.is_built() {
            return None;
        }
        let mut node = self.root();
        for &sym in input {
            let child = self.child(node, sym);
            if child == Self::Id::NULL {
                return None;
            }
            node = child;
        }
        if self.is_final(node) {
            self.value_of(node)
        } else {
            None
        }
    }

    /// Visit every stored pattern that is a prefix of `input`, in
    /// ascending length order, invoking `sink` with `(value, end_offset)`.
    /// Returns the number of visits.
    fn match_prefix(&self, input: &[Self::Sym], sink: &mut dyn Sink<Self::Value>) -> usize {
        if !self.is_built() {
            return 0;
        }
        let mut count = 0;
        let mut node = self.root();
        for (offset, &sym) in input.iter().enumerate() {
            let child = self.child(node, sym);
            if child == Self::Id::NULL {
                break;
            }
            node = child;
            if self.is_final(node) {
                if let Some(value) = self.value_of(node) {
                    sink.emit(value, offset);
                    count += 1;
                }
            }
        }
        count
    }

    /// Discard all state and return to the insert phase.
    fn clear(&mut self);

    /// Number of allocated nodes (backend-specific meaning of "node").
    fn num_nodes(&self) -> usize;

    /// Size in bytes of one backend-specific node record.
    fn node_size_bytes(&self) -> usize;

    /// Human-readable backend name, e.g. `"DoubleArrayTrie"`.
    fn name(&self) -> &'static str;

    /// `nodes=<N>, node_size=<B>, size=<MB>M`. Advisory format; tests
    /// must not depend on exact spacing.
    fn stats(&self) -> String {
        let nodes = self.num_nodes();
        let node_size = self.node_size_bytes();
        let mb = (node_size * nodes) as f64 / (1 << 20) as f64;
        format!("nodes={nodes}, node_size={node_size}, size={mb}M")
    }
}
