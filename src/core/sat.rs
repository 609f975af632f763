//! Support computation, model counting and solution enumeration

use std::collections::hash_map::Entry::{Occupied, Vacant};

use bitvec::prelude::{BitSlice, BitVec};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use rustc_hash::FxHashMap as HashMap;

use crate::core::{
    bdd_manager::DDManager,
    bdd_node::{NodeID, VarID, ONE, ZERO},
};

impl DDManager {
    /// Evaluate `f` under the assignment setting exactly `trues` to true.
    pub fn verify(&self, f: NodeID, trues: &[VarID]) -> bool {
        self.assert_valid(f);

        let mut values = vec![false; self.var_count];
        for var in trues {
            values[var.0 as usize] = true;
        }

        let mut node = f;
        while !node.is_leaf() {
            node = if values[self.var_of(node).0 as usize] {
                self.high_node(node)
            } else {
                self.low_node(node)
            };
        }

        node == ONE
    }

    /// Number of DAG nodes reachable from `f`, terminals included.
    pub fn count_active(&self, f: NodeID) -> usize {
        self.assert_valid(f);

        // HashMap<NodeID, ()> instead of a set for the .entry() API: avoids
        // the double lookup of !contains followed by insert.
        let mut nodes = HashMap::<NodeID, ()>::default();

        let mut stack = vec![f];
        while let Some(x) = stack.pop() {
            match nodes.entry(x) {
                Occupied(_) => continue,
                Vacant(vacant_entry) => {
                    vacant_entry.insert(());
                    if !x.is_leaf() {
                        stack.push(self.low_node(x));
                        stack.push(self.high_node(x));
                    }
                }
            }
        }

        nodes.len()
    }

    //------------------------------------------------------------------------//
    // Support

    /// Variables `f` actually depends on.
    pub fn support(&self, f: NodeID) -> BitVec {
        self.support_walk(f, None)
    }

    /// Like [support](DDManager::support), intersected with `filter` during
    /// the walk.
    pub fn support_filtered(&self, f: NodeID, filter: &BitSlice) -> BitVec {
        self.support_walk(f, Some(filter))
    }

    fn support_walk(&self, f: NodeID, filter: Option<&BitSlice>) -> BitVec {
        self.assert_valid(f);

        let mut support = BitVec::repeat(false, self.var_count);
        let mut visited = HashMap::<NodeID, ()>::default();

        let mut stack = vec![f];
        while let Some(x) = stack.pop() {
            if x.is_leaf() {
                continue;
            }
            match visited.entry(x) {
                Occupied(_) => continue,
                Vacant(vacant_entry) => {
                    vacant_entry.insert(());
                    let var = self.var_of(x).0 as usize;
                    let keep = match filter {
                        Some(filter) => filter.get(var).map(|b| *b).unwrap_or(false),
                        None => true,
                    };
                    if keep {
                        support.set(var, true);
                    }
                    stack.push(self.low_node(x));
                    stack.push(self.high_node(x));
                }
            }
        }

        support
    }

    //------------------------------------------------------------------------//
    // Counting

    /// Number of assignments to all variables that satisfy `f`.
    pub fn sat_count(&mut self, f: NodeID) -> BigUint {
        self.assert_valid(f);
        self.sat_count_rec(f) << self.level(f) as usize
    }

    fn sat_count_rec(&mut self, f: NodeID) -> BigUint {
        if f == ZERO {
            return Zero::zero();
        }
        if f == ONE {
            return One::one();
        }

        if let Some(count) = self.sat_cache.get(f) {
            return count.clone();
        }

        let var = self.var_of(f).0;
        let (low, high) = (self.low_node(f), self.high_node(f));

        // Each level skipped on the way down doubles the count
        let low_jump = (self.level(low) - var - 1) as usize;
        let high_jump = (self.level(high) - var - 1) as usize;

        let total = (self.sat_count_rec(low) << low_jump) + (self.sat_count_rec(high) << high_jump);

        self.sat_cache.put(f, total.clone());
        total
    }

    /// Number of assignments to the variables in `support` that satisfy `f`.
    /// `support` must cover every variable `f` depends on.
    pub fn sat_count_with_support(&self, f: NodeID, support: &BitSlice) -> BigUint {
        self.assert_valid(f);

        let support = self.normalized_var_set(support);
        for var in self.support(f).iter_ones() {
            if !support[var] {
                panic!("support does not cover variable {} of the function", var);
            }
        }

        // rank[l] = number of support variables strictly above level l
        let mut rank = vec![0u32; self.var_count + 1];
        for level in 0..self.var_count {
            rank[level + 1] = rank[level] + support[level] as u32;
        }

        let mut cache = HashMap::<NodeID, BigUint>::default();
        let count = self.sat_count_support_rec(f, &rank, &mut cache);
        count << rank[self.level(f) as usize] as usize
    }

    fn sat_count_support_rec(
        &self,
        f: NodeID,
        rank: &[u32],
        cache: &mut HashMap<NodeID, BigUint>,
    ) -> BigUint {
        if f == ZERO {
            return Zero::zero();
        }
        if f == ONE {
            return One::one();
        }

        if let Some(count) = cache.get(&f) {
            return count.clone();
        }

        let var = self.var_of(f).0 as usize;
        let (low, high) = (self.low_node(f), self.high_node(f));

        let low_jump = (rank[self.level(low) as usize] - rank[var + 1]) as usize;
        let high_jump = (rank[self.level(high) as usize] - rank[var + 1]) as usize;

        let total = (self.sat_count_support_rec(low, rank, cache) << low_jump)
            + (self.sat_count_support_rec(high, rank, cache) << high_jump);

        cache.insert(f, total.clone());
        total
    }

    //------------------------------------------------------------------------//
    // Solutions

    /// Any one satisfying assignment, `None` iff `f` is the zero function.
    pub fn get_satisfying_assignment(&self, f: NodeID) -> Option<BitVec> {
        self.assert_valid(f);
        if f == ZERO {
            return None;
        }

        let mut bits = BitVec::repeat(false, self.var_count);
        let mut node = f;
        while !node.is_leaf() {
            let low = self.low_node(node);
            if low == ZERO {
                bits.set(self.var_of(node).0 as usize, true);
                node = self.high_node(node);
            } else {
                node = low;
            }
        }

        Some(bits)
    }

    /// Lazy stream of all satisfying assignments in lexicographic order
    /// (variable 0 most significant). Yields owned bit-vectors; see
    /// [for_each_solution](DDManager::for_each_solution) for the variant
    /// that lends a shared buffer instead.
    pub fn solution_iterator(&self, f: NodeID) -> SolutionIterator<'_> {
        let support = BitVec::repeat(true, self.var_count);
        SolutionIterator(SolutionCursor::new(self, f, support))
    }

    /// Like [solution_iterator](DDManager::solution_iterator), but variables
    /// outside `support` stay false instead of being enumerated. `support`
    /// must cover every variable `f` depends on.
    pub fn solution_iterator_with_support(
        &self,
        f: NodeID,
        support: &BitSlice,
    ) -> SolutionIterator<'_> {
        let support = self.normalized_var_set(support);
        SolutionIterator(SolutionCursor::new(self, f, support))
    }

    /// Call `callback` once per satisfying assignment. The buffer is reused
    /// between calls; retaining it requires a copy.
    pub fn for_each_solution(&self, f: NodeID, mut callback: impl FnMut(&BitSlice)) {
        let support = BitVec::repeat(true, self.var_count);
        let mut cursor = SolutionCursor::new(self, f, support);
        while let Some(bits) = cursor.advance() {
            callback(bits);
        }
    }

    pub fn for_each_solution_with_support(
        &self,
        f: NodeID,
        support: &BitSlice,
        mut callback: impl FnMut(&BitSlice),
    ) {
        let support = self.normalized_var_set(support);
        let mut cursor = SolutionCursor::new(self, f, support);
        while let Some(bits) = cursor.advance() {
            callback(bits);
        }
    }

    /// Call `callback` once per root-to-one path with the assignment bits
    /// fixed along the path and the mask of which variables the path fixes.
    /// Both buffers are reused between calls. Paths are visited low branch
    /// first, matching the iterator's lexicographic order.
    pub fn for_each_path(&self, f: NodeID, mut callback: impl FnMut(&BitSlice, &BitSlice)) {
        self.assert_valid(f);

        let mut bits = BitVec::repeat(false, self.var_count);
        let mut mask = BitVec::repeat(false, self.var_count);
        self.path_rec(f, &mut bits, &mut mask, &mut callback);
    }

    fn path_rec(
        &self,
        f: NodeID,
        bits: &mut BitVec,
        mask: &mut BitVec,
        callback: &mut impl FnMut(&BitSlice, &BitSlice),
    ) {
        if f == ZERO {
            return;
        }
        if f == ONE {
            callback(bits, mask);
            return;
        }

        let var = self.var_of(f).0 as usize;
        mask.set(var, true);

        bits.set(var, false);
        self.path_rec(self.low_node(f), bits, mask, callback);
        bits.set(var, true);
        self.path_rec(self.high_node(f), bits, mask, callback);

        bits.set(var, false);
        mask.set(var, false);
    }

    /// Copy a caller-supplied variable set into a `var_count`-sized vector.
    fn normalized_var_set(&self, set: &BitSlice) -> BitVec {
        let mut normalized = BitVec::repeat(false, self.var_count);
        for var in set.iter_ones() {
            if var < self.var_count {
                normalized.set(var, true);
            }
        }
        normalized
    }
}

enum CursorState {
    Fresh,
    Running,
    Exhausted,
}

/// Shared machinery behind [SolutionIterator] and the `for_each_solution`
/// family: holds the current assignment plus, per variable level, the node
/// that was in effect when that level's bit was decided. The successor of an
/// assignment is found by flipping the rightmost raisable zero bit and
/// refilling the suffix minimally.
struct SolutionCursor<'a> {
    man: &'a DDManager,
    root: NodeID,
    support: BitVec,
    bits: BitVec,
    trail: Vec<NodeID>,
    state: CursorState,
}

impl<'a> SolutionCursor<'a> {
    fn new(man: &'a DDManager, f: NodeID, support: BitVec) -> Self {
        man.assert_valid(f);
        debug_assert_eq!(support.len(), man.var_count);
        for var in man.support(f).iter_ones() {
            if !support[var] {
                panic!("support does not cover variable {} of the function", var);
            }
        }

        SolutionCursor {
            man,
            root: f,
            support,
            bits: BitVec::repeat(false, man.var_count),
            trail: vec![f; man.var_count + 1],
            state: CursorState::Fresh,
        }
    }

    fn advance(&mut self) -> Option<&BitSlice> {
        let var_count = self.man.var_count;

        match self.state {
            CursorState::Exhausted => None,
            CursorState::Fresh => {
                if self.root == ZERO {
                    self.state = CursorState::Exhausted;
                    return None;
                }
                self.state = CursorState::Running;
                self.fill_minimal(self.root, 0);
                Some(&self.bits)
            }
            CursorState::Running => {
                // Rightmost zero bit that can be raised without losing
                // satisfiability; everything right of it restarts minimal.
                for level in (0..var_count).rev() {
                    if self.bits[level] || !self.support[level] {
                        continue;
                    }
                    let here = self.trail[level];
                    let raised = if !here.is_leaf()
                        && self.man.var_of(here).0 as usize == level
                    {
                        self.man.high_node(here)
                    } else {
                        here
                    };
                    if raised != ZERO {
                        self.bits.set(level, true);
                        self.fill_minimal(raised, level + 1);
                        return Some(&self.bits);
                    }
                }
                self.state = CursorState::Exhausted;
                None
            }
        }
    }

    /// Fill `bits[from..]` with the smallest satisfying suffix reachable
    /// from `node`, recording the trail.
    fn fill_minimal(&mut self, mut node: NodeID, from: usize) {
        let var_count = self.man.var_count;

        for level in from..var_count {
            self.trail[level] = node;
            if !node.is_leaf() && self.man.var_of(node).0 as usize == level {
                let low = self.man.low_node(node);
                if low == ZERO {
                    debug_assert!(self.support[level]);
                    self.bits.set(level, true);
                    node = self.man.high_node(node);
                } else {
                    self.bits.set(level, false);
                    node = low;
                }
            } else {
                self.bits.set(level, false);
            }
        }

        self.trail[var_count] = node;
        debug_assert_eq!(node, ONE, "minimal fill must end in the one terminal");
    }
}

/// Owning solution stream; each item is an independent copy of the cursor
/// buffer. Not restartable.
pub struct SolutionIterator<'a>(SolutionCursor<'a>);

impl Iterator for SolutionIterator<'_> {
    type Item = BitVec;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.advance().map(|bits| bits.to_bitvec())
    }
}
