pub mod core;
pub mod misc;

pub use crate::core::bdd_manager::DDManager;
pub use crate::core::bdd_node::{NodeID, VarID};
pub use crate::core::options::Options;
pub use crate::core::sat::SolutionIterator;
