//! Decision Loom - Influence Diagram Decision Engine
//!
//! This crate turns an influence diagram (decision, uncertainty and utility
//! nodes connected by relevance arcs) into an explicit decision tree: it
//! validates the diagram, derives an evaluation ordering, materializes the
//! tree, and prunes it down to the optimal path once a policy solution is
//! available.

pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
