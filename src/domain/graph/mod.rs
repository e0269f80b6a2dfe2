//! Directed graph support for diagram topology analysis.

mod topology;

pub use topology::GraphTopology;
