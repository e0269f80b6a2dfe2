//! Decision tree materialization and pruning.

mod builder;
mod node;
mod pruner;

pub use builder::{DecisionTreeBuilder, TreeBuildError};
pub use node::{DecisionTree, EndpointNode, NodePayload, ProbabilityView, TreeNode, UtilityView};
pub use pruner::{DecisionTreePruner, PruningError};
