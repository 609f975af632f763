//! Invariant checking and the statistics report. Neither is on a hot path.

use itertools::Itertools;
use rustc_hash::FxHashSet as HashSet;

use crate::core::{
    bdd_manager::DDManager,
    bdd_node::{NodeID, VarID},
};

impl DDManager {
    /// Verify every structural invariant of the node table, the unique
    /// table, the free list and the reference counts.
    /// Returns `Ok(())` or `Err("error message")`.
    pub fn check(&self) -> Result<(), String> {
        let capacity = self.capacity();

        let mut triples = HashSet::<(VarID, NodeID, NodeID)>::default();

        for slot in 0..capacity {
            if !self.used[slot] {
                continue;
            }
            let id = NodeID(slot as i32);
            let (var, low, high) = (self.vars[slot], self.lows[slot], self.highs[slot]);

            if (var.0 as usize) >= self.var_count {
                return Err(format!(
                    "node {:?} labelled {:?}, but only {} variables exist",
                    id, var, self.var_count
                ));
            }
            if low == high {
                return Err(format!("node {:?} is not reduced: both children {:?}", id, low));
            }
            for child in [low, high] {
                if !self.is_node_valid_or_leaf(child) {
                    return Err(format!("node {:?} has reclaimed child {:?}", id, child));
                }
                if !child.is_leaf() && var >= self.var_of(child) {
                    return Err(format!(
                        "ordering violated: node {:?} ({:?}) above child {:?} ({:?})",
                        id,
                        var,
                        child,
                        self.var_of(child)
                    ));
                }
            }

            if !triples.insert((var, low, high)) {
                return Err(format!(
                    "canonicity violated: duplicate triple ({:?}, {:?}, {:?})",
                    var, low, high
                ));
            }

            if !self.chain_reaches(id) {
                return Err(format!("node {:?} not reachable from its hash bucket", id));
            }
        }

        // Every chain entry must be a used slot
        for bucket in 0..self.buckets.len() {
            let mut chain = self.buckets[bucket];
            while chain >= 0 {
                let slot = chain as usize;
                if !self.used[slot] {
                    return Err(format!("free slot {} linked in bucket {}", slot, bucket));
                }
                chain = self.next[slot];
            }
        }

        // Free list covers exactly the unused slots
        let mut free_seen = 0usize;
        let mut cursor = self.free_head;
        while cursor >= 0 {
            let slot = cursor as usize;
            if self.used[slot] {
                return Err(format!("used slot {} threaded on the free list", slot));
            }
            free_seen += 1;
            if free_seen > capacity {
                return Err("free list is cyclic".to_string());
            }
            cursor = self.next[slot];
        }
        if free_seen != self.free_count {
            return Err(format!(
                "free list length {} does not match free count {}",
                free_seen, self.free_count
            ));
        }

        for &pinned in &self.work_stack {
            if !self.is_node_valid_or_leaf(pinned) {
                return Err(format!("work stack holds reclaimed node {:?}", pinned));
            }
        }

        let dead = (0..capacity)
            .filter(|&slot| self.used[slot] && self.refs[slot] == 0)
            .count();
        if dead != self.dead_count {
            return Err(format!(
                "dead-node counter drifted: counted {}, recorded {}",
                dead, self.dead_count
            ));
        }

        for (var, &(pos, neg)) in self.var_nodes.iter().enumerate() {
            for literal in [pos, neg] {
                if !self.is_node_valid_or_leaf(literal) || literal.is_leaf() {
                    return Err(format!("literal of variable {} was reclaimed", var));
                }
                if !self.is_node_saturated(literal) {
                    return Err(format!("literal of variable {} is not saturated", var));
                }
            }
        }

        Ok(())
    }

    fn chain_reaches(&self, id: NodeID) -> bool {
        let slot = id.slot();
        let bucket =
            self.bucket_index(self.vars[slot], self.lows[slot], self.highs[slot]);

        let mut chain = self.buckets[bucket];
        while chain >= 0 {
            if chain == id.0 {
                return true;
            }
            chain = self.next[chain as usize];
        }
        false
    }

    /// Human-readable report: table occupancy, reference state, collection
    /// count, cache hit rates and the unique-table chain histogram.
    pub fn statistics(&self) -> String {
        let capacity = self.capacity();
        let referenced = (0..capacity)
            .filter(|&slot| self.used[slot] && self.refs[slot] > 0)
            .count();

        // Chain lengths 0..=3 and "4 or longer"
        let mut histogram = [0usize; 5];
        for bucket in 0..self.buckets.len() {
            let mut length = 0usize;
            let mut chain = self.buckets[bucket];
            while chain >= 0 {
                length += 1;
                chain = self.next[chain as usize];
            }
            histogram[length.min(4)] += 1;
        }

        let caches = [
            ("negation", self.negation_cache.capacity(), self.negation_cache.stats),
            ("binary", self.binary_cache.capacity(), self.binary_cache.stats),
            ("implies", self.implies_cache.capacity(), self.implies_cache.stats),
            ("ternary", self.ternary_cache.capacity(), self.ternary_cache.stats),
            ("satisfaction", self.sat_cache.capacity(), self.sat_cache.stats),
            ("compose", self.compose_cache.capacity(), self.compose_cache.stats),
            ("quantification", self.quant_cache.capacity(), self.quant_cache.stats),
            ("restrict", self.restrict_cache.capacity(), self.restrict_cache.stats),
        ];
        let cache_lines = caches
            .iter()
            .map(|(name, capacity, stats)| {
                format!(
                    "  {}: {} slots, {} lookups, {:.1}% hits",
                    name,
                    capacity,
                    stats.lookups,
                    100.0 * stats.hit_rate()
                )
            })
            .join("\n");

        format!(
            "DDManager statistics\n\
             nodes: {} live in {} slots ({} referenced, ~{} dead), {} variables\n\
             collections: {}, work stack depth {}\n\
             chain lengths [0,1,2,3,4+]: {:?}\n\
             caches:\n{}",
            self.node_count(),
            capacity,
            referenced,
            self.dead_count,
            self.var_count,
            self.gc_runs,
            self.work_stack.len(),
            histogram,
            cache_lines
        )
    }
}
