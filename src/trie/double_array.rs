//! Double-array trie (DAT): a keyword trie packed into two parallel
//! integer arrays, `base` and `check`, per Aoe's placement technique.
//!
//! Grounded on `da_trie.h`'s `DaTrie`: recursive-by-depth node placement
//! (iterative here, via an explicit work stack, per the open design note
//! about bounding recursion depth), a free-slot ring for O(1)-amortized
//! placement search, and the terminal-slot convention that repurposes a
//! node's own `base` field to hold a value index once it has no further
//! children.

use std::marker::PhantomData;
use std::mem::size_of;

use crate::error::TrieError;
use crate::node_id::{usize_to_node_id, NodeId};
use crate::symbol::Symbol;
use crate::trie::Trie;

#[derive(Clone, Copy)]
struct Unit<Id> {
    base: Id,
    check: Id,
}

impl<Id: NodeId> Default for Unit<Id> {
    fn default() -> Self {
        Unit {
            base: Id::NULL,
            check: Id::NULL,
        }
    }
}

#[derive(Clone, Copy)]
struct Aux {
    prev: usize,
    next: usize,
    used: bool,
}

impl Default for Aux {
    fn default() -> Self {
        Aux {
            prev: 0,
            next: 0,
            used: false,
        }
    }
}

/// A double-array trie over symbols of type `S`, storing values of type
/// `V`, with node ids represented as `Id` (default `u32`).
///
/// `'p` is the lifetime of the pattern buffers passed to `insert`; they
/// must stay alive until `build` completes.
pub struct DoubleArrayTrie<'p, S: Symbol, V: Copy, Id: NodeId = u32> {
    units: Vec<Unit<Id>>,
    values: Vec<V>,
    keys: Vec<&'p [S]>,
    built: bool,
    free_head: usize,
    aux: Vec<Aux>,
    _marker: PhantomData<S>,
}

impl<'p, S: Symbol, V: Copy, Id: NodeId> Default for DoubleArrayTrie<'p, S, V, Id> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'p, S: Symbol, V: Copy, Id: NodeId> DoubleArrayTrie<'p, S, V, Id> {
    pub fn new() -> Self {
        DoubleArrayTrie {
            units: Vec::new(),
            values: Vec::new(),
            keys: Vec::new(),
            built: false,
            free_head: 0,
            aux: Vec::new(),
            _marker: PhantomData,
        }
    }

    fn label_at(&self, key_idx: usize, depth: usize) -> S {
        let key = self.keys[key_idx];
        if depth < key.len() {
            key[depth]
        } else {
            S::NULL
        }
    }

    /// Grow `units`/`aux` to `n` slots, threading freshly added slots into
    /// the free-slot ring just before the sentinel. Mirrors `da_trie.h`'s
    /// `Resize`.
    fn resize(&mut self, n: usize) {
        if n <= self.units.len() {
            return;
        }
        log::trace!("double-array trie growing to {n} slots");
        if usize_to_node_id::<Id>(n.saturating_sub(1)).is_none() {
            panic!("double-array trie exceeds NodeId capacity ({n} slots requested)");
        }

        self.units.resize(n, Unit::default());
        let old_len = self.aux.len();
        self.aux.resize(n, Aux::default());
        for i in (old_len + 1)..n {
            self.aux[i - 1].next = i;
            self.aux[i].prev = i - 1;
        }
        let old_tail = self.aux[self.free_head].prev;
        let new_tail = n - 1;
        self.aux[old_tail].next = old_len;
        self.aux[old_len].prev = old_tail;
        self.aux[self.free_head].prev = new_tail;
        self.aux[new_tail].next = self.free_head;
    }

    fn reserve(&mut self, index: usize) {
        self.aux[index].used = true;
        let prev = self.aux[index].prev;
        let next = self.aux[index].next;
        self.aux[prev].next = next;
        self.aux[next].prev = prev;
    }

    /// Find a `base` such that `base + idx(l)` is free for every label
    /// `l` in `labels`, walking the free-slot ring in ascending-id order
    /// and falling back to placement at the end of the array. Mirrors
    /// `da_trie.h`'s `Fetch`.
    fn fetch(&self, labels: &[S]) -> usize {
        let first = labels[0].to_index();
        let mut free_idx = self.aux[self.free_head].next;
        while free_idx != self.free_head {
            // Invariant: every non-sentinel ring entry is >= free_head + 1
            // > ALPHABET_SIZE > idx(l) for any label l, so this never
            // underflows.
            let base = free_idx - first;
            let mut fits = true;
            for &label in labels {
                let p = base + label.to_index();
                if p >= self.units.len() {
                    break;
                } else if self.aux[p].used {
                    fits = false;
                    break;
                }
            }
            if fits {
                return base;
            }
            free_idx = self.aux[free_idx].next;
        }
        self.units.len() - first
    }

    fn insert_units(&mut self, parent: usize, base: usize, labels: &[S]) {
        if labels.is_empty() {
            return;
        }
        let max_idx = base + labels[labels.len() - 1].to_index();
        self.resize(max_idx + 1);
        for &label in labels {
            let idx = base + label.to_index();
            self.reserve(idx);
            self.units[idx].check = Id::from_usize(parent);
        }
    }

    /// Build every node reachable from `kids[lo..hi)`, a contiguous,
    /// already-sorted-and-deduped range of key ids sharing their first
    /// `depth` labels. Uses an explicit work stack rather than recursion
    /// by depth, per the open design note bounding stack usage on
    /// deeply-nested pattern sets.
    fn build_node(&mut self, kids: &[usize]) {
        let mut stack = vec![(0usize, Id::ROOT.to_usize(), 0usize, kids.len())];
        while let Some((depth, parent, lo, hi)) = stack.pop() {
            if lo == hi {
                continue;
            }

            let mut labels: Vec<S> = Vec::new();
            let mut guards: Vec<usize> = Vec::new();
            for i in lo..hi {
                let label = self.label_at(kids[i], depth);
                if labels.last() != Some(&label) {
                    labels.push(label);
                    guards.push(i);
                }
            }
            guards.push(hi);

            let base = self.fetch(&labels);
            self.units[parent].base = Id::from_usize(base);
            self.insert_units(parent, base, &labels);

            let mut final_slot = 0usize;
            if labels[0] == S::NULL {
                final_slot = 1;
                let child = base + labels[0].to_index();
                self.units[child].base = Id::from_usize(kids[lo]);
            }

            for i in (final_slot..labels.len()).rev() {
                let child = base + labels[i].to_index();
                stack.push((depth + 1, child, guards[i], guards[i + 1]));
            }
        }
    }
}

impl<'p, S: Symbol, V: Copy, Id: NodeId> Trie<'p> for DoubleArrayTrie<'p, S, V, Id> {
    type Sym = S;
    type Value = V;
    type Id = Id;

    fn root(&self) -> Id {
        Id::ROOT
    }

    fn insert(&mut self, pattern: &'p [S], value: V) -> Result<bool, TrieError> {
        if self.built {
            return Ok(false);
        }
        if pattern.iter().any(|&s| s == S::NULL) {
            return Err(TrieError::NullSymbolInPattern);
        }
        self.keys.push(pattern);
        self.values.push(value);
        Ok(true)
    }

    fn build(&mut self) -> bool {
        if self.built {
            return false;
        }
        self.built = true;

        let mut kids: Vec<usize> = (0..self.keys.len()).collect();
        let keys = &self.keys;
        kids.sort_by(|&a, &b| {
            let ka = keys[a].iter().map(|s| s.to_index());
            let kb = keys[b].iter().map(|s| s.to_index());
            ka.cmp(kb).then(a.cmp(&b))
        });
        kids.dedup_by(|&mut a, &mut b| {
            keys[a].iter().map(|s| s.to_index()).eq(keys[b].iter().map(|s| s.to_index()))
        });

        log::debug!(
            "double-array trie build: {} patterns -> {} distinct keys",
            self.keys.len(),
            kids.len()
        );

        self.free_head = S::ALPHABET_SIZE + Id::ROOT.to_usize();
        self.units = vec![Unit::default(); self.free_head + 1];
        self.aux = vec![Aux::default(); self.free_head + 1];
        self.aux[self.free_head].prev = self.free_head;
        self.aux[self.free_head].next = self.free_head;
        self.units[Id::ROOT.to_usize()].check = Id::ROOT;

        self.build_node(&kids);

        self.keys = Vec::new();
        self.aux = Vec::new();

        true
    }

    fn is_built(&self) -> bool {
        self.built
    }

    fn child(&self, parent: Id, label: S) -> Id {
        if label == S::NULL {
            // Index 0 is the terminal-slot marker, not a real edge: its
            // `base` field is repurposed to hold a value index.
            return Id::NULL;
        }
        let p = parent.to_usize();
        if p >= self.units.len() {
            return Id::NULL;
        }
        let c = self.units[p].base.to_usize() + label.to_index();
        if c < self.units.len() && self.units[c].check == parent {
            Id::from_usize(c)
        } else {
            Id::NULL
        }
    }

    fn is_final(&self, node: Id) -> bool {
        let n = node.to_usize();
        if n >= self.units.len() {
            return false;
        }
        let t = self.units[n].base.to_usize();
        t < self.units.len() && self.units[t].check == node
    }

    fn value_of(&self, node: Id) -> Option<V> {
        if !self.is_final(node) {
            return None;
        }
        let n = node.to_usize();
        let t = self.units[n].base.to_usize();
        let value_idx = self.units[t].base.to_usize();
        self.values.get(value_idx).copied()
    }

    fn for_each_child(&self, parent: Id, visit: &mut dyn FnMut(S, Id)) {
        let p = parent.to_usize();
        if p >= self.units.len() {
            return;
        }
        let base = self.units[p].base.to_usize();
        // Skip index 0: that's the NullSym terminal marker, not a real
        // child edge.
        for label_idx in 1..S::ALPHABET_SIZE {
            let c = base + label_idx;
            if c < self.units.len() && self.units[c].check == parent {
                visit(S::from_index(label_idx), Id::from_usize(c));
            }
        }
    }

    fn clear(&mut self) {
        self.units.clear();
        self.values.clear();
        self.keys.clear();
        self.aux.clear();
        self.built = false;
        self.free_head = 0;
    }

    fn num_nodes(&self) -> usize {
        self.units.len()
    }

    fn node_size_bytes(&self) -> usize {
        size_of::<Unit<Id>>()
    }

    fn name(&self) -> &'static str {
        "DoubleArrayTrie"
    }
}
