//! Conditional probability and utility table generation.

mod generator;

pub use generator::DiscreteTableGenerator;
