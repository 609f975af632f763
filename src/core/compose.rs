//! Simultaneous substitution and constant restriction

use bitvec::prelude::BitSlice;

use crate::core::{
    bdd_manager::DDManager,
    bdd_node::{NodeID, PLACEHOLDER},
    cache::QUANT_RESTRICT,
};

#[inline]
fn bit(bits: &BitSlice, index: usize) -> bool {
    bits.get(index).map(|b| *b).unwrap_or(false)
}

/// Canonical word form of a bit set, highest zero words trimmed. `mask`
/// restricts which positions count (used to ignore value bits of variables
/// that are not restricted).
fn set_words(bits: &BitSlice, mask: Option<&BitSlice>) -> Vec<u64> {
    let mut words = vec![0u64; (bits.len() + 63) / 64];
    for index in bits.iter_ones() {
        if mask.map_or(true, |m| bit(m, index)) {
            words[index / 64] |= 1 << (index % 64);
        }
    }
    while words.last() == Some(&0) {
        words.pop();
    }
    words
}

impl DDManager {
    /// Substitute `map[v]` for every variable `v` *simultaneously*: the map
    /// entries may themselves depend on substituted variables, so each node
    /// of `f` is rewritten in a single pass, combining the rewritten children
    /// via `ite(map[v], high, low)`. A [placeholder](DDManager::placeholder)
    /// entry leaves the variable unchanged, and a map shorter than the
    /// variable count is padded with placeholders.
    ///
    /// The map nodes must be pinned by the caller; a collection triggered by
    /// the substitution itself will not see them otherwise.
    pub fn compose(&mut self, f: NodeID, map: &[NodeID]) -> NodeID {
        self.assert_valid(f);
        for &replacement in map {
            if replacement != PLACEHOLDER {
                self.assert_valid(replacement);
            }
        }

        // Trailing placeholders do not affect the result; trimming them
        // canonicalizes the cache key.
        let len = map
            .iter()
            .rposition(|&replacement| replacement != PLACEHOLDER)
            .map_or(0, |last| last + 1);
        let map = &map[..len];
        if map.is_empty() {
            return f;
        }

        self.compose_cache.activate(map);
        self.compose_rec(f, map)
    }

    fn compose_rec(&mut self, f: NodeID, map: &[NodeID]) -> NodeID {
        if f.is_leaf() {
            return f;
        }
        let var = self.var_of(f);
        if var.0 as usize >= map.len() {
            // Ordering: every variable in this cone is past the map
            return f;
        }

        if let Some(result) = self.compose_cache.get(f) {
            return result;
        }

        let (f_low, f_high) = (self.low_node(f), self.high_node(f));

        let low = self.compose_rec(f_low, map);
        self.push_to_work_stack(low);
        let high = self.compose_rec(f_high, map);
        self.push_to_work_stack(high);

        let replacement = map[var.0 as usize];
        let result = if replacement == PLACEHOLDER {
            self.make_node(var, low, high)
        } else {
            self.ite(replacement, high, low)
        };
        self.pop_work_stack_many(2);

        self.compose_cache.put(f, result);
        result
    }

    /// Propagate constants: every variable whose bit is set in `vars` is
    /// fixed to its bit in `values`. The support of the result is disjoint
    /// from `vars`.
    pub fn restrict(&mut self, f: NodeID, vars: &BitSlice, values: &BitSlice) -> NodeID {
        self.assert_valid(f);

        let last = match vars.last_one() {
            Some(last) => last,
            None => return f,
        };

        // Signature: set length, then the variable words, then the value
        // words masked down to the restricted variables.
        let mut signature = vec![vars.len() as u64];
        signature.extend(set_words(vars, None));
        signature.extend(set_words(values, Some(vars)));
        self.restrict_cache.activate(QUANT_RESTRICT, &signature);

        self.restrict_rec(f, vars, values, last)
    }

    fn restrict_rec(&mut self, f: NodeID, vars: &BitSlice, values: &BitSlice, last: usize) -> NodeID {
        if f.is_leaf() {
            return f;
        }
        let var = self.var_of(f);
        if var.0 as usize > last {
            return f;
        }

        if let Some(result) = self.restrict_cache.get(f) {
            return result;
        }

        let result = if bit(vars, var.0 as usize) {
            let child = if bit(values, var.0 as usize) {
                self.high_node(f)
            } else {
                self.low_node(f)
            };
            self.restrict_rec(child, vars, values, last)
        } else {
            let (f_low, f_high) = (self.low_node(f), self.high_node(f));

            let low = self.restrict_rec(f_low, vars, values, last);
            self.push_to_work_stack(low);
            let high = self.restrict_rec(f_high, vars, values, last);
            self.push_to_work_stack(high);

            let rebuilt = self.make_node(var, low, high);
            self.pop_work_stack_many(2);
            rebuilt
        };

        self.restrict_cache.put(f, result);
        result
    }
}
