//! The recursive Shannon-expansion operators
#![allow(rustdoc::private_intra_doc_links)]

use crate::core::{
    bdd_manager::DDManager,
    bdd_node::{NodeID, ONE, ZERO},
};

/// Enum representing the binary connectives.
///
/// # Adding Operations
/// When an operation is added to this enum, the constant function
/// [`binary_op_functions`] also has to be modified so that it returns the
/// necessary functions for terminal cases in a [`BinaryOpFunctions`] struct.
/// **If you forget changing the function, the compiler should warn you.**
/// Four functions need to be implemented:
/// * `both_terminal`: both operands are single terminal nodes.
/// * `first_terminal`: only the first operand is a terminal node (which can
///   be handled in constant time).
/// * `second_terminal`: only the second operand is a terminal node (for
///   symmetric operations, this can call `first_terminal` with swapped
///   parameters).
/// * `both_equal`: both operands are the same node.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) enum BinaryOp {
    And,
    Or,
    Xor,
    Equivalence,
    Implication,
    Nand,
}

impl BinaryOp {
    /// Cache key tag
    pub(crate) fn tag(self) -> u8 {
        match self {
            BinaryOp::And => 0,
            BinaryOp::Or => 1,
            BinaryOp::Xor => 2,
            BinaryOp::Equivalence => 3,
            BinaryOp::Implication => 4,
            BinaryOp::Nand => 5,
        }
    }

    pub(crate) fn is_commutative(self) -> bool {
        !matches!(self, BinaryOp::Implication)
    }
}

/// Cache tag of the boolean `implies` test in its dedicated cache
pub(crate) const IMPLIES_TAG: u8 = 6;

struct BinaryOpFunctions {
    both_terminal: fn(&mut DDManager, NodeID, NodeID) -> NodeID,
    first_terminal: fn(&mut DDManager, NodeID, NodeID) -> NodeID,
    second_terminal: fn(&mut DDManager, NodeID, NodeID) -> NodeID,
    both_equal: fn(&mut DDManager, NodeID) -> NodeID,
}

const fn binary_op_functions(op: BinaryOp) -> BinaryOpFunctions {
    match op {
        BinaryOp::And => {
            const BOTH_TERMINAL: fn(&mut DDManager, NodeID, NodeID) -> NodeID =
                |_, u, v| if u == ONE && v == ONE { ONE } else { ZERO };
            const FIRST_TERMINAL: fn(&mut DDManager, NodeID, NodeID) -> NodeID =
                |_, u, v| if u == ZERO { ZERO } else { v };
            const SECOND_TERMINAL: fn(&mut DDManager, NodeID, NodeID) -> NodeID =
                |man, u, v| FIRST_TERMINAL(man, v, u);
            const BOTH_EQUAL: fn(&mut DDManager, NodeID) -> NodeID = |_, u| u;
            BinaryOpFunctions {
                both_terminal: BOTH_TERMINAL,
                first_terminal: FIRST_TERMINAL,
                second_terminal: SECOND_TERMINAL,
                both_equal: BOTH_EQUAL,
            }
        }
        BinaryOp::Or => {
            const BOTH_TERMINAL: fn(&mut DDManager, NodeID, NodeID) -> NodeID =
                |_, u, v| if u == ONE || v == ONE { ONE } else { ZERO };
            const FIRST_TERMINAL: fn(&mut DDManager, NodeID, NodeID) -> NodeID =
                |_, u, v| if u == ZERO { v } else { ONE };
            const SECOND_TERMINAL: fn(&mut DDManager, NodeID, NodeID) -> NodeID =
                |man, u, v| FIRST_TERMINAL(man, v, u);
            const BOTH_EQUAL: fn(&mut DDManager, NodeID) -> NodeID = |_, u| u;
            BinaryOpFunctions {
                both_terminal: BOTH_TERMINAL,
                first_terminal: FIRST_TERMINAL,
                second_terminal: SECOND_TERMINAL,
                both_equal: BOTH_EQUAL,
            }
        }
        BinaryOp::Xor => {
            const BOTH_TERMINAL: fn(&mut DDManager, NodeID, NodeID) -> NodeID =
                |_, u, v| if u == v { ZERO } else { ONE };
            const FIRST_TERMINAL: fn(&mut DDManager, NodeID, NodeID) -> NodeID =
                |man, u, v| if u == ZERO { v } else { man.not_entry(v) };
            const SECOND_TERMINAL: fn(&mut DDManager, NodeID, NodeID) -> NodeID =
                |man, u, v| FIRST_TERMINAL(man, v, u);
            const BOTH_EQUAL: fn(&mut DDManager, NodeID) -> NodeID = |_, _| ZERO;
            BinaryOpFunctions {
                both_terminal: BOTH_TERMINAL,
                first_terminal: FIRST_TERMINAL,
                second_terminal: SECOND_TERMINAL,
                both_equal: BOTH_EQUAL,
            }
        }
        BinaryOp::Equivalence => {
            const BOTH_TERMINAL: fn(&mut DDManager, NodeID, NodeID) -> NodeID =
                |_, u, v| if u == v { ONE } else { ZERO };
            const FIRST_TERMINAL: fn(&mut DDManager, NodeID, NodeID) -> NodeID =
                |man, u, v| if u == ONE { v } else { man.not_entry(v) };
            const SECOND_TERMINAL: fn(&mut DDManager, NodeID, NodeID) -> NodeID =
                |man, u, v| FIRST_TERMINAL(man, v, u);
            const BOTH_EQUAL: fn(&mut DDManager, NodeID) -> NodeID = |_, _| ONE;
            BinaryOpFunctions {
                both_terminal: BOTH_TERMINAL,
                first_terminal: FIRST_TERMINAL,
                second_terminal: SECOND_TERMINAL,
                both_equal: BOTH_EQUAL,
            }
        }
        BinaryOp::Implication => {
            const BOTH_TERMINAL: fn(&mut DDManager, NodeID, NodeID) -> NodeID =
                |_, u, v| if u == ONE && v == ZERO { ZERO } else { ONE };
            const FIRST_TERMINAL: fn(&mut DDManager, NodeID, NodeID) -> NodeID =
                |_, u, v| if u == ZERO { ONE } else { v };
            const SECOND_TERMINAL: fn(&mut DDManager, NodeID, NodeID) -> NodeID =
                |man, u, v| if v == ONE { ONE } else { man.not_entry(u) };
            const BOTH_EQUAL: fn(&mut DDManager, NodeID) -> NodeID = |_, _| ONE;
            BinaryOpFunctions {
                both_terminal: BOTH_TERMINAL,
                first_terminal: FIRST_TERMINAL,
                second_terminal: SECOND_TERMINAL,
                both_equal: BOTH_EQUAL,
            }
        }
        BinaryOp::Nand => {
            const BOTH_TERMINAL: fn(&mut DDManager, NodeID, NodeID) -> NodeID =
                |_, u, v| if u == ONE && v == ONE { ZERO } else { ONE };
            const FIRST_TERMINAL: fn(&mut DDManager, NodeID, NodeID) -> NodeID =
                |man, u, v| if u == ZERO { ONE } else { man.not_entry(v) };
            const SECOND_TERMINAL: fn(&mut DDManager, NodeID, NodeID) -> NodeID =
                |man, u, v| FIRST_TERMINAL(man, v, u);
            const BOTH_EQUAL: fn(&mut DDManager, NodeID) -> NodeID = |man, u| man.not_entry(u);
            BinaryOpFunctions {
                both_terminal: BOTH_TERMINAL,
                first_terminal: FIRST_TERMINAL,
                second_terminal: SECOND_TERMINAL,
                both_equal: BOTH_EQUAL,
            }
        }
    }
}

/// Commutative operands go through the cache in ascending id order.
pub(crate) fn normalize_commutative(op: BinaryOp, f: NodeID, g: NodeID) -> (NodeID, NodeID) {
    if op.is_commutative() && g < f {
        (g, f)
    } else {
        (f, g)
    }
}

impl DDManager {
    /// Negation respecting the configured engine, used from terminal tables
    /// which are shared by the recursive and the iterative implementation.
    pub(crate) fn not_entry(&mut self, f: NodeID) -> NodeID {
        if self.options.iterative {
            self.not_iter(f)
        } else {
            self.not_rec(f)
        }
    }

    /// Constant-time cases: terminal operands or equal operands. `None`
    /// means the caller has to expand.
    pub(crate) fn binary_shortcut(&mut self, op: BinaryOp, f: NodeID, g: NodeID) -> Option<NodeID> {
        let funcs = binary_op_functions(op);
        if f.is_leaf() && g.is_leaf() {
            Some((funcs.both_terminal)(self, f, g))
        } else if f.is_leaf() {
            Some((funcs.first_terminal)(self, f, g))
        } else if g.is_leaf() {
            Some((funcs.second_terminal)(self, f, g))
        } else if f == g {
            Some((funcs.both_equal)(self, f))
        } else {
            None
        }
    }

    pub(crate) fn binary_rec(&mut self, op: BinaryOp, f: NodeID, g: NodeID) -> NodeID {
        if let Some(result) = self.binary_shortcut(op, f, g) {
            return result;
        }
        let (f, g) = normalize_commutative(op, f, g);

        if let Some(result) = self.binary_cache.get(op.tag(), f, g) {
            return result;
        }

        let top = self.top_var(f, g);
        let (f_low, f_high) = self.cofactors(f, top);
        let (g_low, g_high) = self.cofactors(g, top);

        let low = self.binary_rec(op, f_low, g_low);
        self.push_to_work_stack(low);
        let high = self.binary_rec(op, f_high, g_high);
        self.push_to_work_stack(high);

        let result = self.make_node(top, low, high);
        self.pop_work_stack_many(2);

        self.binary_cache.put(op.tag(), f, g, result);
        result
    }

    pub(crate) fn not_rec(&mut self, f: NodeID) -> NodeID {
        if f == ZERO {
            return ONE;
        }
        if f == ONE {
            return ZERO;
        }

        if let Some(result) = self.negation_cache.get(f) {
            return result;
        }

        let var = self.var_of(f);
        let (f_low, f_high) = (self.low_node(f), self.high_node(f));

        let low = self.not_rec(f_low);
        self.push_to_work_stack(low);
        let high = self.not_rec(f_high);
        self.push_to_work_stack(high);

        let result = self.make_node(var, low, high);
        self.pop_work_stack_many(2);

        self.negation_cache.put(f, result);
        result
    }

    /// The implication *test*: true iff every satisfying assignment of `f`
    /// satisfies `g`. Expands like a binary operator but never allocates, so
    /// no work-stack bookkeeping is needed.
    pub(crate) fn implies_rec(&mut self, f: NodeID, g: NodeID) -> bool {
        if f == ZERO || g == ONE || f == g {
            return true;
        }
        // Canonicity: a non-ONE function has a falsifying assignment
        if f == ONE {
            return false;
        }
        if g == ZERO {
            return false;
        }

        if let Some(result) = self.implies_cache.get(IMPLIES_TAG, f, g) {
            return result == ONE;
        }

        let top = self.top_var(f, g);
        let (f_low, f_high) = self.cofactors(f, top);
        let (g_low, g_high) = self.cofactors(g, top);

        let holds = self.implies_rec(f_low, g_low) && self.implies_rec(f_high, g_high);

        self.implies_cache
            .put(IMPLIES_TAG, f, g, if holds { ONE } else { ZERO });
        holds
    }
}
