//! Peek Driver
//!
//! Reference implementation of the solve/resolve loop:
//!
//! ```text
//! stage = 0
//! loop {
//!     results = solve(envelopes, axis)
//!     if !resolve(envelopes, results, axis, stage) { break }
//!     stage += 1
//! }
//! ```
//!
//! The solver is an external collaborator behind the [`Solver`] trait. The
//! driver never integrates balances itself.
//!
//! # Example
//!
//! ```rust
//! use envelope_peek_core::models::{Envelope, EnvelopeSet, GrowthModel, ResultSet};
//! use envelope_peek_core::orchestrator::{DriverConfig, PeekDriver, Solver, SolverError};
//! use envelope_peek_core::{PeekRun, RunToken, TimeAxis};
//!
//! struct FlatSolver;
//!
//! impl Solver for FlatSolver {
//!     fn solve(
//!         &mut self,
//!         envelopes: &EnvelopeSet,
//!         axis: &TimeAxis,
//!         token: RunToken,
//!     ) -> Result<ResultSet, SolverError> {
//!         let mut results = ResultSet::new(token);
//!         for name in envelopes.names() {
//!             results.insert(name, vec![0.0; axis.len()]);
//!         }
//!         Ok(results)
//!     }
//! }
//!
//! let axis = TimeAxis::new(vec![0, 30]).unwrap();
//! let mut envelopes =
//!     EnvelopeSet::from_envelopes(vec![Envelope::new("cash", GrowthModel::none())]).unwrap();
//! let mut run = PeekRun::new();
//!
//! let mut driver = PeekDriver::new(FlatSolver, DriverConfig::default());
//! let report = driver.run(&mut run, &mut envelopes, &axis).unwrap();
//! assert_eq!(report.passes, 1);
//! assert_eq!(report.operations_applied, 0);
//! ```

use crate::core::time::{Stage, TimeAxis};
use crate::models::envelope::EnvelopeSet;
use crate::models::results::ResultSet;
use crate::orchestrator::checkpoint::{compute_plan_hash, CheckpointError};
use crate::peek::diagnostics::Diagnostic;
use crate::peek::run::{PeekError, PeekRun, RunToken};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

// ============================================================================
// Configuration Types
// ============================================================================

/// Driver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Number of stages (0..max_stages) allowed to apply work
    #[serde(default = "default_max_stages")]
    pub max_stages: Stage,
}

fn default_max_stages() -> Stage {
    32
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_stages: default_max_stages(),
        }
    }
}

// ============================================================================
// Solver Interface
// ============================================================================

/// External solver failure
#[derive(Debug, Error, PartialEq)]
#[error("Solver failed: {0}")]
pub struct SolverError(pub String);

/// Turns envelopes and a time axis into balance series
///
/// Implementations must stamp the returned [`ResultSet`] with `token`.
pub trait Solver {
    fn solve(
        &mut self,
        envelopes: &EnvelopeSet,
        axis: &TimeAxis,
        token: RunToken,
    ) -> Result<ResultSet, SolverError>;
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Run already resolved stages; clear it before driving")]
    RunNotFresh,

    #[error("Stage limit of {limit} reached with operations still queued for stage {limit}")]
    StageLimitExceeded { limit: Stage },

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error(transparent)]
    Peek(#[from] PeekError),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
}

// ============================================================================
// Driver
// ============================================================================

/// Summary of a completed run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub token: RunToken,

    /// Solver invocations
    pub passes: usize,

    /// Stages that applied at least one operation
    pub stages_applied: usize,

    pub operations_applied: usize,

    pub descriptors_synthesized: usize,

    /// Operations left in stages the loop never reached
    pub pending_operations: usize,

    pub diagnostics: Vec<Diagnostic>,

    /// Fingerprint of the plan after the final stage
    pub plan_hash: String,

    /// Output of the final solver pass
    pub results: ResultSet,
}

impl RunReport {
    pub fn has_pending_work(&self) -> bool {
        self.pending_operations > 0
    }
}

pub struct PeekDriver<S: Solver> {
    solver: S,
    config: DriverConfig,
}

impl<S: Solver> PeekDriver<S> {
    pub fn new(solver: S, config: DriverConfig) -> Self {
        Self { solver, config }
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Drive `run` to completion
    ///
    /// The run must be fresh (new, or cleared) with its operations already
    /// enqueued. Stops at the first stage that applies nothing.
    pub fn run(
        &mut self,
        run: &mut PeekRun,
        envelopes: &mut EnvelopeSet,
        axis: &TimeAxis,
    ) -> Result<RunReport, DriverError> {
        if run.resolved_through().is_some() {
            return Err(DriverError::RunNotFresh);
        }

        info!(
            run = %run.token(),
            envelopes = envelopes.len(),
            queued = run.pending(),
            "peek run starting"
        );

        let mut passes = 0;
        let mut stages_applied = 0;
        let mut operations_applied = 0;
        let mut descriptors_synthesized = 0;
        let mut stage: Stage = 0;

        let results = loop {
            let results = self.solver.solve(envelopes, axis, run.token())?;
            passes += 1;

            if stage >= self.config.max_stages {
                if run.pending_in_stage(stage) > 0 {
                    return Err(DriverError::StageLimitExceeded {
                        limit: self.config.max_stages,
                    });
                }
                break results;
            }

            let outcome = run.resolve_stage(envelopes, &results, axis, stage)?;
            if !outcome.applied() {
                break results;
            }

            stages_applied += 1;
            operations_applied += outcome.operations;
            descriptors_synthesized += outcome.descriptors;

            stage += 1;
        };

        let pending_operations = run.pending();
        if pending_operations > 0 {
            warn!(
                run = %run.token(),
                pending_operations,
                next_stage = ?run.next_pending_stage(),
                "peek run stopped with unreached stages"
            );
        }

        let plan_hash = compute_plan_hash(envelopes, axis)?;
        info!(
            run = %run.token(),
            passes,
            operations_applied,
            descriptors_synthesized,
            "peek run complete"
        );

        Ok(RunReport {
            token: run.token(),
            passes,
            stages_applied,
            operations_applied,
            descriptors_synthesized,
            pending_operations,
            diagnostics: run.take_diagnostics(),
            plan_hash,
            results,
        })
    }
}
