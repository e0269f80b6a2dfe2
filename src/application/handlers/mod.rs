//! Engine command handlers.

mod build_decision_tree;
mod compute_partial_order;
mod prune_optimal_tree;
mod regenerate_tables;

pub use build_decision_tree::{BuildDecisionTreeCommand, BuildDecisionTreeHandler};
pub use compute_partial_order::{ComputePartialOrderCommand, ComputePartialOrderHandler};
pub use prune_optimal_tree::{PruneOptimalTreeCommand, PruneOptimalTreeHandler};
pub use regenerate_tables::{RegenerateTablesCommand, RegenerateTablesHandler};
