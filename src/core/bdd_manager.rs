//! Manager state, construction and the public operation entry points

use std::fmt;

use bitvec::prelude::BitVec;

use crate::{
    core::{
        bdd_node::{NodeID, VarID, ONE, PLACEHOLDER, ZERO},
        cache::{BinaryCache, ComposeCache, QuantCache, SatCache, TernaryCache, UnaryCache},
        ops::BinaryOp,
        options::Options,
    },
    misc::primes::next_prime,
};

/// Container combining the node table, the unique-table chains, the manual
/// reference counts with their work stack, and the operation caches.
///
/// Node handles returned by operations are *unreferenced*; callers pin nodes
/// they want to survive garbage collection with [reference](DDManager::reference)
/// or, across a single computation, [push_to_work_stack](DDManager::push_to_work_stack).
pub struct DDManager {
    // Node table, parallel columns indexed by slot
    pub(crate) vars: Vec<VarID>,
    pub(crate) lows: Vec<NodeID>,
    pub(crate) highs: Vec<NodeID>,
    pub(crate) refs: Vec<u32>,
    /// Unique-table chain link, doubling as free-list link for free slots
    pub(crate) next: Vec<i32>,
    pub(crate) used: BitVec,
    pub(crate) marked: BitVec,
    /// Unique-table bucket heads, -1 empty
    pub(crate) buckets: Vec<i32>,
    pub(crate) free_head: i32,
    pub(crate) free_count: usize,
    /// Approximate count of unreferenced live slots
    pub(crate) dead_count: usize,

    // Variables: saturated positive/negative literal nodes, creation order
    pub(crate) var_count: usize,
    pub(crate) var_nodes: Vec<(NodeID, NodeID)>,

    // Memory manager
    pub(crate) work_stack: Vec<NodeID>,
    pub(crate) gc_runs: usize,

    // Operation caches
    pub(crate) negation_cache: UnaryCache,
    pub(crate) binary_cache: BinaryCache,
    pub(crate) implies_cache: BinaryCache,
    pub(crate) ternary_cache: TernaryCache,
    pub(crate) sat_cache: SatCache,
    pub(crate) compose_cache: ComposeCache,
    pub(crate) quant_cache: QuantCache,
    pub(crate) restrict_cache: QuantCache,

    pub(crate) options: Options,
}

impl fmt::Debug for DDManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DDManager [{} nodes in {} slots, {} variables, {} collections]",
            self.node_count(),
            self.capacity(),
            self.var_count,
            self.gc_runs
        )
    }
}

impl Default for DDManager {
    fn default() -> Self {
        Self::with_options(Options::default())
    }
}

impl Drop for DDManager {
    fn drop(&mut self) {
        if self.options.log_statistics_on_shutdown {
            log::info!("{}", self.statistics());
        }
    }
}

fn cache_capacity(table_capacity: usize, divider: usize) -> usize {
    (table_capacity / divider).max(1)
}

impl DDManager {
    pub fn with_options(options: Options) -> Self {
        options.validate();
        let capacity = next_prime(options.initial_size.max(128) as u64) as usize;

        let mut man = DDManager {
            vars: vec![VarID(0); capacity],
            lows: vec![ZERO; capacity],
            highs: vec![ZERO; capacity],
            refs: vec![0; capacity],
            next: vec![-1; capacity],
            used: BitVec::repeat(false, capacity),
            marked: BitVec::repeat(false, capacity),
            buckets: vec![-1; capacity],
            free_head: -1,
            free_count: 0,
            dead_count: 0,
            var_count: 0,
            var_nodes: Vec::new(),
            work_stack: Vec::new(),
            gc_runs: 0,
            negation_cache: UnaryCache::with_capacity(cache_capacity(
                capacity,
                options.cache_negation_divider,
            )),
            binary_cache: BinaryCache::with_capacity(cache_capacity(
                capacity,
                options.cache_binary_divider,
            )),
            implies_cache: BinaryCache::with_capacity(cache_capacity(
                capacity,
                options.cache_satisfaction_divider,
            )),
            ternary_cache: TernaryCache::with_capacity(cache_capacity(
                capacity,
                options.cache_ternary_divider,
            )),
            sat_cache: SatCache::with_capacity(cache_capacity(
                capacity,
                options.cache_satisfaction_divider,
            )),
            compose_cache: ComposeCache::with_capacity(cache_capacity(
                capacity,
                options.cache_compose_divider,
            )),
            quant_cache: QuantCache::with_capacity(cache_capacity(
                capacity,
                options.cache_compose_divider,
            )),
            restrict_cache: QuantCache::with_capacity(cache_capacity(
                capacity,
                options.cache_compose_divider,
            )),
            options,
        };

        man.rebuild_chains_and_free_list();
        man
    }

    pub(crate) fn resize_caches(&mut self) {
        let capacity = self.capacity();
        self.negation_cache
            .resize(cache_capacity(capacity, self.options.cache_negation_divider));
        self.binary_cache
            .resize(cache_capacity(capacity, self.options.cache_binary_divider));
        self.implies_cache.resize(cache_capacity(
            capacity,
            self.options.cache_satisfaction_divider,
        ));
        self.ternary_cache
            .resize(cache_capacity(capacity, self.options.cache_ternary_divider));
        self.sat_cache.resize(cache_capacity(
            capacity,
            self.options.cache_satisfaction_divider,
        ));
        self.compose_cache
            .resize(cache_capacity(capacity, self.options.cache_compose_divider));
        self.quant_cache
            .resize(cache_capacity(capacity, self.options.cache_compose_divider));
        self.restrict_cache
            .resize(cache_capacity(capacity, self.options.cache_compose_divider));
    }

    /// Drop every cached operation result. Also happens on every collection.
    pub fn invalidate_cache(&mut self) {
        self.negation_cache.clear();
        self.binary_cache.clear();
        self.implies_cache.clear();
        self.ternary_cache.clear();
        self.sat_cache.clear();
        self.compose_cache.clear();
        self.quant_cache.clear();
        self.restrict_cache.clear();
    }

    //------------------------------------------------------------------------//
    // Constants

    pub fn zero(&self) -> NodeID {
        ZERO
    }

    pub fn one(&self) -> NodeID {
        ONE
    }

    /// Compose-map entry meaning "leave this variable unchanged"
    pub fn placeholder(&self) -> NodeID {
        PLACEHOLDER
    }

    //------------------------------------------------------------------------//
    // Variables

    pub fn var_count(&self) -> usize {
        self.var_count
    }

    /// Append a new variable at the bottom of the order and return its
    /// positive literal. Both literal nodes are created saturated, so they
    /// survive every collection.
    pub fn create_variable(&mut self) -> NodeID {
        let var = VarID(self.var_count as u32);
        self.var_count += 1;

        let pos = self.make_node(var, ZERO, ONE);
        self.saturate_node(pos);
        let neg = self.make_node(var, ONE, ZERO);
        self.saturate_node(neg);

        self.var_nodes.push((pos, neg));
        pos
    }

    pub fn create_variables(&mut self, count: usize) -> Vec<NodeID> {
        (0..count).map(|_| self.create_variable()).collect()
    }

    pub fn ith_var(&self, var: VarID) -> NodeID {
        match self.var_nodes.get(var.0 as usize) {
            Some((pos, _)) => *pos,
            None => panic!("variable {:?} was never created", var),
        }
    }

    pub fn nith_var(&self, var: VarID) -> NodeID {
        match self.var_nodes.get(var.0 as usize) {
            Some((_, neg)) => *neg,
            None => panic!("variable {:?} was never created", var),
        }
    }

    //------------------------------------------------------------------------//
    // Operation entry points. The recursive and the explicit-stack engines
    // produce identical canonical ids; the choice is made at construction.

    pub fn not(&mut self, f: NodeID) -> NodeID {
        self.assert_valid(f);
        if self.options.iterative {
            self.not_iter(f)
        } else {
            self.not_rec(f)
        }
    }

    pub fn and(&mut self, f: NodeID, g: NodeID) -> NodeID {
        self.binary(BinaryOp::And, f, g)
    }

    pub fn or(&mut self, f: NodeID, g: NodeID) -> NodeID {
        self.binary(BinaryOp::Or, f, g)
    }

    pub fn xor(&mut self, f: NodeID, g: NodeID) -> NodeID {
        self.binary(BinaryOp::Xor, f, g)
    }

    pub fn equivalence(&mut self, f: NodeID, g: NodeID) -> NodeID {
        self.binary(BinaryOp::Equivalence, f, g)
    }

    pub fn implication(&mut self, f: NodeID, g: NodeID) -> NodeID {
        self.binary(BinaryOp::Implication, f, g)
    }

    pub fn nand(&mut self, f: NodeID, g: NodeID) -> NodeID {
        self.binary(BinaryOp::Nand, f, g)
    }

    fn binary(&mut self, op: BinaryOp, f: NodeID, g: NodeID) -> NodeID {
        self.assert_valid(f);
        self.assert_valid(g);
        if self.options.iterative {
            self.binary_iter(op, f, g)
        } else {
            self.binary_rec(op, f, g)
        }
    }

    pub fn ite(&mut self, f: NodeID, g: NodeID, h: NodeID) -> NodeID {
        self.assert_valid(f);
        self.assert_valid(g);
        self.assert_valid(h);
        if self.options.iterative {
            self.ite_iter(f, g, h)
        } else {
            self.ite_rec(f, g, h)
        }
    }

    /// Does every satisfying assignment of `f` satisfy `g`? Decided without
    /// materialising `implication(f, g)`.
    pub fn implies(&mut self, f: NodeID, g: NodeID) -> bool {
        self.assert_valid(f);
        self.assert_valid(g);
        self.implies_rec(f, g)
    }
}
