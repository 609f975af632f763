//! Explicit-stack forms of the Shannon operators.
//!
//! Same expansions, same caches and the same canonical results as the
//! recursive forms, but driven by a frame stack instead of the call stack,
//! so BDD depth cannot overflow the host stack. Subresults are parked on the
//! manager's work stack, which keeps them alive across collections at the
//! same time: a combine step finds its low/high results as the two topmost
//! work-stack entries, replaces them with the combined node and caches it.

use crate::core::{
    bdd_manager::DDManager,
    bdd_node::{NodeID, VarID, ONE, ZERO},
    ite::normalize_ite_args,
    ops::{normalize_commutative, BinaryOp},
};

enum UnaryFrame {
    Expand(NodeID),
    Combine(NodeID, VarID),
}

enum BinaryFrame {
    Expand(NodeID, NodeID),
    Combine(NodeID, NodeID, VarID),
}

enum TernaryFrame {
    Expand(NodeID, NodeID, NodeID),
    Combine(NodeID, NodeID, NodeID, VarID),
}

impl DDManager {
    /// Two topmost work-stack entries are the low and high subresult, low
    /// below high. Replace them with the node combining them.
    fn combine_subresults(&mut self, var: VarID) -> NodeID {
        let depth = self.work_stack_depth();
        debug_assert!(depth >= 2, "combine without two pending subresults");
        let high = self.work_stack[depth - 1];
        let low = self.work_stack[depth - 2];

        let result = self.make_node(var, low, high);
        self.pop_work_stack_many(2);
        self.push_to_work_stack(result);
        result
    }

    pub(crate) fn not_iter(&mut self, f: NodeID) -> NodeID {
        let mut frames = vec![UnaryFrame::Expand(f)];

        while let Some(frame) = frames.pop() {
            match frame {
                UnaryFrame::Expand(f) => {
                    if f == ZERO {
                        self.push_to_work_stack(ONE);
                        continue;
                    }
                    if f == ONE {
                        self.push_to_work_stack(ZERO);
                        continue;
                    }
                    if let Some(result) = self.negation_cache.get(f) {
                        self.push_to_work_stack(result);
                        continue;
                    }

                    frames.push(UnaryFrame::Combine(f, self.var_of(f)));
                    frames.push(UnaryFrame::Expand(self.high_node(f)));
                    frames.push(UnaryFrame::Expand(self.low_node(f)));
                }
                UnaryFrame::Combine(f, var) => {
                    let result = self.combine_subresults(var);
                    self.negation_cache.put(f, result);
                }
            }
        }

        self.pop_work_stack()
    }

    pub(crate) fn binary_iter(&mut self, op: BinaryOp, f: NodeID, g: NodeID) -> NodeID {
        let mut frames = vec![BinaryFrame::Expand(f, g)];

        while let Some(frame) = frames.pop() {
            match frame {
                BinaryFrame::Expand(f, g) => {
                    if let Some(result) = self.binary_shortcut(op, f, g) {
                        self.push_to_work_stack(result);
                        continue;
                    }
                    let (f, g) = normalize_commutative(op, f, g);
                    if let Some(result) = self.binary_cache.get(op.tag(), f, g) {
                        self.push_to_work_stack(result);
                        continue;
                    }

                    let top = self.top_var(f, g);
                    let (f_low, f_high) = self.cofactors(f, top);
                    let (g_low, g_high) = self.cofactors(g, top);

                    // Low is processed first, so its result sits below high
                    frames.push(BinaryFrame::Combine(f, g, top));
                    frames.push(BinaryFrame::Expand(f_high, g_high));
                    frames.push(BinaryFrame::Expand(f_low, g_low));
                }
                BinaryFrame::Combine(f, g, var) => {
                    let result = self.combine_subresults(var);
                    self.binary_cache.put(op.tag(), f, g, result);
                }
            }
        }

        self.pop_work_stack()
    }

    pub(crate) fn ite_iter(&mut self, f: NodeID, g: NodeID, h: NodeID) -> NodeID {
        let mut frames = vec![TernaryFrame::Expand(f, g, h)];

        while let Some(frame) = frames.pop() {
            match frame {
                TernaryFrame::Expand(f, g, h) => {
                    let (f, g, h) = normalize_ite_args(f, g, h);
                    if let Some(result) = self.ite_shortcut(f, g, h) {
                        self.push_to_work_stack(result);
                        continue;
                    }
                    if let Some(result) = self.ternary_cache.get(f, g, h) {
                        self.push_to_work_stack(result);
                        continue;
                    }

                    let top = self.top_var3(f, g, h);
                    let (f_low, f_high) = self.cofactors(f, top);
                    let (g_low, g_high) = self.cofactors(g, top);
                    let (h_low, h_high) = self.cofactors(h, top);

                    frames.push(TernaryFrame::Combine(f, g, h, top));
                    frames.push(TernaryFrame::Expand(f_high, g_high, h_high));
                    frames.push(TernaryFrame::Expand(f_low, g_low, h_low));
                }
                TernaryFrame::Combine(f, g, h, var) => {
                    let result = self.combine_subresults(var);
                    self.ternary_cache.put(f, g, h, result);
                }
            }
        }

        self.pop_work_stack()
    }
}
