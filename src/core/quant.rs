//! Existential and universal quantification

use bitvec::prelude::{BitSlice, BitVec};

use crate::core::{
    bdd_manager::DDManager,
    bdd_node::{NodeID, VarID},
    cache::{QUANT_EXISTS, QUANT_FORALL},
};

impl DDManager {
    /// `∃ vars. f`: disjunction of both cofactors at every quantified level.
    pub fn exists(&mut self, f: NodeID, vars: &[VarID]) -> NodeID {
        self.quantify(f, vars, QUANT_EXISTS)
    }

    /// `∀ vars. f`: conjunction of both cofactors at every quantified level.
    pub fn forall(&mut self, f: NodeID, vars: &[VarID]) -> NodeID {
        self.quantify(f, vars, QUANT_FORALL)
    }

    fn quantify(&mut self, f: NodeID, vars: &[VarID], op: u8) -> NodeID {
        self.assert_valid(f);
        let last = match vars.iter().map(|v| v.0 as usize).max() {
            Some(last) => last,
            None => return f,
        };

        let mut set: BitVec = BitVec::repeat(false, last + 1);
        for var in vars {
            set.set(var.0 as usize, true);
        }

        // Canonical set words key the volatile cache
        let words: Vec<u64> = set
            .chunks(64)
            .map(|chunk| {
                chunk
                    .iter_ones()
                    .fold(0u64, |word, offset| word | (1 << offset))
            })
            .collect();
        self.quant_cache.activate(op, &words);

        self.quant_rec(f, &set, last, op)
    }

    fn quant_rec(&mut self, f: NodeID, set: &BitSlice, last: usize, op: u8) -> NodeID {
        if f.is_leaf() {
            return f;
        }
        let var = self.var_of(f);
        if var.0 as usize > last {
            // Ordering: no quantified variable occurs in this cone
            return f;
        }

        if let Some(result) = self.quant_cache.get(f) {
            return result;
        }

        let (f_low, f_high) = (self.low_node(f), self.high_node(f));

        let low = self.quant_rec(f_low, set, last, op);
        self.push_to_work_stack(low);
        let high = self.quant_rec(f_high, set, last, op);
        self.push_to_work_stack(high);

        let result = if set[var.0 as usize] {
            if op == QUANT_EXISTS {
                self.or(low, high)
            } else {
                self.and(low, high)
            }
        } else {
            self.make_node(var, low, high)
        };
        self.pop_work_stack_many(2);

        self.quant_cache.put(f, result);
        result
    }
}
