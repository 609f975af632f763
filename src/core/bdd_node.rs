//! Type definitions for the elements of the BDD:
//! node handles ([NodeID]) and variables ([VarID])

/// Handle to a node owned by a [DDManager](crate::core::bdd_manager::DDManager).
///
/// Internal nodes are non-negative slot indexes into the manager's node table
/// and stay stable across garbage collection. The terminal nodes and the
/// compose placeholder are negative sentinels; clients obtain them through
/// the manager accessors and must not assume anything about the encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeID(pub(crate) i32);

/// Variable number, zero-based. The variable order is the creation order.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct VarID(pub u32);

/// Terminal node "one", the constant true function
pub(crate) const ONE: NodeID = NodeID(-1);

/// Terminal node "zero", the constant false function
pub(crate) const ZERO: NodeID = NodeID(-2);

/// Compose-map sentinel: leave this variable unchanged
pub(crate) const PLACEHOLDER: NodeID = NodeID(-3);

impl NodeID {
    #[inline]
    pub(crate) fn is_leaf(self) -> bool {
        self == ZERO || self == ONE
    }

    /// Slot index of an internal node. Callers check [is_leaf](NodeID::is_leaf).
    #[inline]
    pub(crate) fn slot(self) -> usize {
        debug_assert!(self.0 >= 0, "slot() on terminal node {:?}", self);
        self.0 as usize
    }
}
