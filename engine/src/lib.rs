//! Envelope Peek Core - staged dependency resolution
//!
//! Some envelope events depend on the simulated trajectory of other
//! envelopes: tax owed depends on income, a top-up depends on an account
//! crossing zero. A single solver pass cannot see those. This crate defers
//! such computations as stage-tagged peek operations, applies them once an
//! earlier pass has produced results, and drives the solver until a stage
//! synthesizes nothing.
//!
//! # Architecture
//!
//! - **core**: Time axis and day lookup
//! - **models**: Domain types (Envelope, Descriptor, GrowthModel, ResultSet)
//! - **peek**: Run-scoped queue, stage resolver, diagnostics
//! - **synthesis**: Compensation, propagation and marginal tax strategies
//! - **orchestrator**: Solve/resolve driver and plan checkpoints
//!
//! # Critical Invariants
//!
//! 1. Resolution only appends descriptors, never edits or removes them
//! 2. Every queued operation is applied at most once
//! 3. Synthesized descriptors keep the growth model captured at synthesis time
//! 4. Results from another run are never resolved

// Module declarations
pub mod core;
pub mod models;
pub mod orchestrator;
pub mod peek;
pub mod synthesis;

// Re-exports for convenience
pub use crate::core::time::{Day, DayIndex, Stage, TimeAxis, TimeAxisError};
pub use models::{
    descriptor::{Descriptor, DescriptorError, DescriptorKind, Direction, Provenance},
    envelope::{Envelope, EnvelopeSet, PlanError},
    growth::{GrowthKind, GrowthModel},
    results::{ResultSeries, ResultSet},
};
pub use orchestrator::{
    CheckpointError, DriverConfig, DriverError, PeekDriver, PlanSnapshot, RunReport, Solver,
    SolverError,
};
pub use peek::{
    Diagnostic, DiagnosticKind, OperationId, PeekError, PeekOperation, PeekRun, RunToken,
    StageContext, StageOutcome,
};
