//! Application layer - command handlers over the engine core.
//!
//! Handlers wire the ports to the domain services and dispatch the
//! CPU-bound core work (validate → order → build → prune) to a blocking
//! worker task, so the cooperative request-handling host is never
//! stalled by tree materialization over large diagrams.

pub mod handlers;

mod errors;

pub use errors::EngineError;
