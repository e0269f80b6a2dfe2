//! Evaluation ordering of decisions and uncertainties.

mod partial_order;

pub use partial_order::{PartialOrder, PartialOrderCalculator};
