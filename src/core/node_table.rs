//! The node table: parallel slot columns plus the chained unique table that
//! makes `(var, low, high)` triples canonical.

use crate::{
    core::{
        bdd_manager::DDManager,
        bdd_node::{NodeID, VarID},
    },
    misc::{hash::mix3, primes::next_prime},
};

#[inline]
fn word(n: NodeID) -> u64 {
    n.0 as u32 as u64
}

impl DDManager {
    //------------------------------------------------------------------------//
    // Accessors

    /// Total slots, used and free.
    pub fn capacity(&self) -> usize {
        self.vars.len()
    }

    /// Live nodes currently in the table.
    pub fn node_count(&self) -> usize {
        self.capacity() - self.free_count
    }

    pub fn is_leaf(&self, f: NodeID) -> bool {
        f.is_leaf()
    }

    /// A usable operand: a terminal or a live internal node.
    pub fn is_node_valid_or_leaf(&self, f: NodeID) -> bool {
        if f.is_leaf() {
            return true;
        }
        f.0 >= 0 && (f.0 as usize) < self.capacity() && self.used[f.0 as usize]
    }

    pub(crate) fn assert_valid(&self, f: NodeID) {
        if !self.is_node_valid_or_leaf(f) {
            panic!("invalid node id {:?}: not a terminal and not a live slot", f);
        }
    }

    /// Variable labelling `f`. Callers check [is_leaf](DDManager::is_leaf).
    pub fn var_of(&self, f: NodeID) -> VarID {
        debug_assert!(self.used[f.slot()], "var_of on a reclaimed slot {:?}", f);
        self.vars[f.slot()]
    }

    /// Child selected when the variable is false. Callers check `is_leaf`.
    pub fn low_node(&self, f: NodeID) -> NodeID {
        debug_assert!(self.used[f.slot()], "low_node on a reclaimed slot {:?}", f);
        self.lows[f.slot()]
    }

    /// Child selected when the variable is true. Callers check `is_leaf`.
    pub fn high_node(&self, f: NodeID) -> NodeID {
        debug_assert!(self.used[f.slot()], "high_node on a reclaimed slot {:?}", f);
        self.highs[f.slot()]
    }

    /// Depth of `f` in the order: its variable number, or one past the last
    /// variable for terminals.
    pub(crate) fn level(&self, f: NodeID) -> u32 {
        if f.is_leaf() {
            self.var_count as u32
        } else {
            self.var_of(f).0
        }
    }

    /// Cofactors of `f` with respect to `v`: `(low, high)` if `v` labels `f`,
    /// `(f, f)` if the variable does not occur at this level.
    pub(crate) fn cofactors(&self, f: NodeID, v: VarID) -> (NodeID, NodeID) {
        if !f.is_leaf() && self.var_of(f) == v {
            (self.low_node(f), self.high_node(f))
        } else {
            (f, f)
        }
    }

    /// Topmost variable of two non-terminal operands.
    pub(crate) fn top_var(&self, f: NodeID, g: NodeID) -> VarID {
        debug_assert!(!f.is_leaf() && !g.is_leaf());
        self.var_of(f).min(self.var_of(g))
    }

    /// Topmost variable among three operands, terminals skipped. At least one
    /// operand must be internal.
    pub(crate) fn top_var3(&self, f: NodeID, g: NodeID, h: NodeID) -> VarID {
        let mut top: Option<VarID> = None;
        for n in [f, g, h] {
            if !n.is_leaf() {
                let v = self.var_of(n);
                top = Some(match top {
                    Some(t) => t.min(v),
                    None => v,
                });
            }
        }
        top.expect("top_var3 called with three terminal operands")
    }

    //------------------------------------------------------------------------//
    // Unique table

    #[inline]
    pub(crate) fn bucket_index(&self, var: VarID, low: NodeID, high: NodeID) -> usize {
        let hash = mix3(var.0 as u64, word(low), word(high));
        ((hash & 0x7fff_ffff) % self.buckets.len() as u64) as usize
    }

    /// Canonical node for `(var, low, high)`.
    ///
    /// Returns `low` when the children coincide (reducedness) and the existing
    /// id when the triple is already in the unique table. May run a collection
    /// and grow the table when no slot is free; the children themselves are
    /// never collected here, but any other unreferenced intermediate is — the
    /// caller keeps such nodes on the work stack.
    pub fn make_node(&mut self, var: VarID, low: NodeID, high: NodeID) -> NodeID {
        if low == high {
            return low;
        }

        self.assert_valid(low);
        self.assert_valid(high);
        debug_assert!(
            (var.0 as usize) < self.var_count,
            "node variable {:?} out of range (have {})",
            var,
            self.var_count
        );
        debug_assert!(
            low.is_leaf() || var < self.var_of(low),
            "variable order violated: {:?} above low child {:?}",
            var,
            self.var_of(low)
        );
        debug_assert!(
            high.is_leaf() || var < self.var_of(high),
            "variable order violated: {:?} above high child {:?}",
            var,
            self.var_of(high)
        );

        let mut bucket = self.bucket_index(var, low, high);
        let mut chain = self.buckets[bucket];
        while chain >= 0 {
            let slot = chain as usize;
            if self.vars[slot] == var && self.lows[slot] == low && self.highs[slot] == high {
                return NodeID(chain);
            }
            chain = self.next[slot];
        }

        if self.free_head < 0 {
            self.ensure_free_slot();
            // Collection rebuilt the chains and growth may have moved the
            // bucket; the triple is still absent.
            bucket = self.bucket_index(var, low, high);
        }

        let slot = self.free_head as usize;
        self.free_head = self.next[slot];
        self.free_count -= 1;

        self.vars[slot] = var;
        self.lows[slot] = low;
        self.highs[slot] = high;
        self.refs[slot] = 0;
        self.used.set(slot, true);
        // Fresh nodes start unreferenced
        self.dead_count += 1;

        self.next[slot] = self.buckets[bucket];
        self.buckets[bucket] = slot as i32;

        NodeID(slot as i32)
    }

    /// Collection safe point: runs when `make_node` finds the free list
    /// empty. Grows the table when the collection left it too full.
    fn ensure_free_slot(&mut self) {
        self.collect_garbage();

        let min_free = (self.capacity() as f32 * self.options.growth_threshold) as usize;
        if self.free_count <= min_free {
            self.grow();
        }
    }

    fn grow(&mut self) {
        let old_capacity = self.capacity();
        let new_capacity = next_prime(
            ((old_capacity as f32 * self.options.growth_factor).ceil() as u64)
                .max(old_capacity as u64 + 1),
        ) as usize;

        self.vars.resize(new_capacity, VarID(0));
        self.lows.resize(new_capacity, NodeID(0));
        self.highs.resize(new_capacity, NodeID(0));
        self.refs.resize(new_capacity, 0);
        self.next.resize(new_capacity, -1);
        self.used.resize(new_capacity, false);
        self.marked.resize(new_capacity, false);
        self.buckets = vec![-1; new_capacity];

        self.rebuild_chains_and_free_list();
        self.resize_caches();

        log::info!(
            "node table grown from {} to {} slots ({} live)",
            old_capacity,
            new_capacity,
            self.node_count()
        );
    }

    /// Rehash every live node into fresh bucket chains and thread the free
    /// list through the unused slots, lowest index on top.
    pub(crate) fn rebuild_chains_and_free_list(&mut self) {
        self.buckets.fill(-1);
        self.free_head = -1;
        self.free_count = 0;

        for slot in (0..self.capacity()).rev() {
            if self.used[slot] {
                let bucket = self.bucket_index(self.vars[slot], self.lows[slot], self.highs[slot]);
                self.next[slot] = self.buckets[bucket];
                self.buckets[bucket] = slot as i32;
            } else {
                self.next[slot] = self.free_head;
                self.free_head = slot as i32;
                self.free_count += 1;
            }
        }
    }
}
