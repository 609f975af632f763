//! The ITE operator

use crate::core::{
    bdd_manager::DDManager,
    bdd_node::{NodeID, ONE, ZERO},
};

/// Bring ITE calls of the form
/// ite(f,f,h) = ite(f,1,h) = ite(h,1,f)
/// ite(f,g,f) = ite(f,g,0) = ite(g,f,0)
/// into canonical form
pub(crate) fn normalize_ite_args(
    mut f: NodeID,
    mut g: NodeID,
    mut h: NodeID,
) -> (NodeID, NodeID, NodeID) {
    if f == g {
        g = ONE;
    } else if f == h {
        h = ZERO;
    }

    let order = |a, b| if a < b { (a, b) } else { (b, a) };

    if g == ONE {
        (f, h) = order(f, h);
    }
    if h == ZERO {
        (f, g) = order(f, g);
    }

    (f, g, h)
}

impl DDManager {
    /// Constant-time ITE cases after normalization. `None` means expand.
    pub(crate) fn ite_shortcut(&mut self, f: NodeID, g: NodeID, h: NodeID) -> Option<NodeID> {
        match (f, g, h) {
            (_, ONE, ZERO) => Some(f),
            (ONE, _, _) => Some(g),
            (ZERO, _, _) => Some(h),
            (_, t, e) if t == e => Some(t),
            (_, ZERO, ONE) => Some(self.not_entry(f)),
            _ => None,
        }
    }

    pub(crate) fn ite_rec(&mut self, f: NodeID, g: NodeID, h: NodeID) -> NodeID {
        let (f, g, h) = normalize_ite_args(f, g, h);
        if let Some(result) = self.ite_shortcut(f, g, h) {
            return result;
        }

        if let Some(result) = self.ternary_cache.get(f, g, h) {
            return result;
        }

        let top = self.top_var3(f, g, h);
        let (f_low, f_high) = self.cofactors(f, top);
        let (g_low, g_high) = self.cofactors(g, top);
        let (h_low, h_high) = self.cofactors(h, top);

        let low = self.ite_rec(f_low, g_low, h_low);
        self.push_to_work_stack(low);
        let high = self.ite_rec(f_high, g_high, h_high);
        self.push_to_work_stack(high);

        let result = self.make_node(top, low, high);
        self.pop_work_stack_many(2);

        self.ternary_cache.put(f, g, h, result);
        result
    }
}
