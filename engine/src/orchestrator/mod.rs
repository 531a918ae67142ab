//! Orchestrator - drives the solve/resolve loop
//!
//! See `engine.rs` for the driver and `checkpoint.rs` for plan snapshots.

pub mod checkpoint;
pub mod engine;

// Re-export main types for convenience
pub use engine::{DriverConfig, DriverError, PeekDriver, RunReport, Solver, SolverError};

pub use checkpoint::{compute_hash, compute_plan_hash, CheckpointError, PlanSnapshot};
