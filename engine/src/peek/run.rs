//! Run-scoped peek state and the stage resolver
//!
//! A [`PeekRun`] owns everything that must not outlive one simulation run:
//! the queue, the diagnostics channel, the set of resolved stages and the
//! run token. Result sets carry the token they were produced under, and a
//! resolve against a token from another run (or an earlier generation of
//! this one) is rejected before anything is touched.
//!
//! # Critical Invariants
//!
//! 1. **At most once**: an operation leaves the queue in the same step that applies it
//! 2. **Stage isolation**: resolving stage `s` never touches entries of other stages
//! 3. **Append-only**: resolution only pushes descriptors onto target envelopes
//! 4. **No stale resolves**: results from another run are rejected
//! 5. **Resolved stages are closed**: once stage `s` has been resolved in a
//!    generation (with or without work), nothing more can be queued into `s`

use crate::core::time::{Stage, TimeAxis};
use crate::models::envelope::EnvelopeSet;
use crate::models::results::ResultSet;
use crate::peek::context::StageContext;
use crate::peek::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::peek::operation::PeekOperation;
use crate::peek::queue::{OperationId, PeekQueue, StagedOperation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// Queue-discipline violations
#[derive(Debug, Error, PartialEq)]
pub enum PeekError {
    #[error("Results belong to run {found}, current run is {expected}")]
    StaleRun { expected: RunToken, found: RunToken },

    #[error("Stage {stage} has already been resolved in this run")]
    StageAlreadyResolved { stage: Stage },
}

/// Identity of one simulation run
///
/// `clear` keeps the run id and bumps the generation, so result sets produced
/// before a clear no longer match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunToken {
    pub run_id: Uuid,
    pub generation: u64,
}

impl fmt::Display for RunToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.run_id, self.generation)
    }
}

/// What one stage resolution did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageOutcome {
    pub stage: Stage,
    /// Operations drained from the queue
    pub operations: usize,
    /// Descriptors appended across all targets
    pub descriptors: usize,
    /// Diagnostics recorded during this resolution
    pub diagnostics: usize,
}

impl StageOutcome {
    /// True when at least one operation matched the stage
    pub fn applied(&self) -> bool {
        self.operations > 0
    }
}

/// Peek state for one simulation run
///
/// # Example
///
/// ```rust
/// use envelope_peek_core::models::{Envelope, EnvelopeSet, GrowthModel, ResultSet};
/// use envelope_peek_core::synthesis::reset_to_zero;
/// use envelope_peek_core::{PeekRun, TimeAxis};
///
/// let axis = TimeAxis::new(vec![0, 30]).unwrap();
/// let mut envelopes =
///     EnvelopeSet::from_envelopes(vec![Envelope::new("checking", GrowthModel::none())]).unwrap();
///
/// let mut run = PeekRun::new();
/// run.enqueue(0, reset_to_zero("checking", 30)).unwrap();
///
/// let results = ResultSet::new(run.token()).with_series("checking", vec![0.0, 37.5]);
/// assert!(run.resolve(&mut envelopes, &results, &axis, 0).unwrap());
/// assert_eq!(envelopes.get("checking").unwrap().descriptors().len(), 1);
/// assert!(!run.resolve(&mut envelopes, &results, &axis, 1).unwrap());
/// ```
#[derive(Debug)]
pub struct PeekRun {
    token: RunToken,
    queue: PeekQueue,
    next_id: u64,
    resolved: BTreeSet<Stage>,
    diagnostics: Diagnostics,
}

impl Default for PeekRun {
    fn default() -> Self {
        Self::new()
    }
}

impl PeekRun {
    /// Start a fresh run with an empty queue
    pub fn new() -> Self {
        let token = RunToken {
            run_id: Uuid::new_v4(),
            generation: 0,
        };
        info!(run = %token, "peek run created");

        Self {
            token,
            queue: PeekQueue::new(),
            next_id: 0,
            resolved: BTreeSet::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn token(&self) -> RunToken {
        self.token
    }

    /// Drop all queued work and start a new generation
    ///
    /// Must be called before stage 0 of every fresh simulation of the same
    /// plan. Returns the new token; result sets stamped with the old one are
    /// rejected from now on.
    pub fn clear(&mut self) -> RunToken {
        let dropped = self.queue.len();
        self.queue.clear();
        self.resolved.clear();
        self.diagnostics.clear();
        self.token.generation += 1;

        info!(run = %self.token, dropped, "peek run cleared");
        self.token
    }

    /// Queue `operation` to run when `stage` is resolved
    ///
    /// Fails if `stage` has already been resolved in this generation, since
    /// the operation could never run. Lower stages that were never resolved
    /// stay open.
    pub fn enqueue(&mut self, stage: Stage, operation: PeekOperation) -> Result<OperationId, PeekError> {
        if self.resolved.contains(&stage) {
            return Err(PeekError::StageAlreadyResolved { stage });
        }

        let id = OperationId(self.next_id);
        self.next_id += 1;

        debug!(
            id = id.0,
            stage,
            strategy = operation.strategy(),
            envelope = operation.target(),
            "peek operation enqueued"
        );
        self.queue.push(StagedOperation {
            id,
            stage,
            operation,
        });

        Ok(id)
    }

    /// Apply every operation tagged `stage`; true iff any matched
    pub fn resolve(
        &mut self,
        envelopes: &mut EnvelopeSet,
        results: &ResultSet,
        axis: &TimeAxis,
        stage: Stage,
    ) -> Result<bool, PeekError> {
        self.resolve_stage(envelopes, results, axis, stage)
            .map(|outcome| outcome.applied())
    }

    /// Apply every operation tagged `stage` and report what happened
    ///
    /// Operations run in insertion order. Each one reads the context and its
    /// descriptors are appended to its target before the next one runs. The
    /// stage is closed to further `enqueue` calls even when nothing matched.
    pub fn resolve_stage(
        &mut self,
        envelopes: &mut EnvelopeSet,
        results: &ResultSet,
        axis: &TimeAxis,
        stage: Stage,
    ) -> Result<StageOutcome, PeekError> {
        if results.token() != self.token {
            return Err(PeekError::StaleRun {
                expected: self.token,
                found: results.token(),
            });
        }

        let mut outcome = StageOutcome {
            stage,
            ..StageOutcome::default()
        };

        // An empty resolve still closes the stage; envelopes and queue are untouched
        self.resolved.insert(stage);

        let selected = self.queue.take_stage(stage);
        if selected.is_empty() {
            debug!(stage, "no peek operations for stage");
            return Ok(outcome);
        }

        // Built fresh per resolve; the axis may differ between stages
        let day_index = axis.day_index();

        for entry in selected {
            let synthesized = {
                let ctx = StageContext::new(stage, envelopes, results, axis, &day_index);
                entry.operation.apply(&ctx)
            };

            let target = entry.operation.target();
            outcome.operations += 1;

            for kind in synthesized.diagnostics {
                self.record(stage, &entry, kind);
                outcome.diagnostics += 1;
            }

            let appended = synthesized.descriptors.len();
            if appended > 0 {
                match envelopes.get_mut(target) {
                    Some(envelope) => {
                        for descriptor in synthesized.descriptors {
                            envelope.push(descriptor.synthesized_at(stage));
                        }
                        outcome.descriptors += appended;
                    }
                    None => {
                        let kind = DiagnosticKind::MissingEnvelope {
                            envelope: target.to_string(),
                        };
                        self.record(stage, &entry, kind);
                        outcome.diagnostics += 1;
                    }
                }
            }

            debug!(
                id = entry.id.0,
                stage,
                strategy = entry.operation.strategy(),
                envelope = target,
                appended,
                "peek operation applied"
            );
        }

        info!(
            run = %self.token,
            stage,
            operations = outcome.operations,
            descriptors = outcome.descriptors,
            diagnostics = outcome.diagnostics,
            "stage resolved"
        );

        Ok(outcome)
    }

    fn record(&mut self, stage: Stage, entry: &StagedOperation, kind: DiagnosticKind) {
        self.diagnostics.record(Diagnostic {
            stage,
            operation: entry.id,
            target: entry.operation.target().to_string(),
            kind,
        });
    }

    /// Number of operations still waiting
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn pending_in_stage(&self, stage: Stage) -> usize {
        self.queue.count_in_stage(stage)
    }

    /// Lowest stage that still has queued work
    pub fn next_pending_stage(&self) -> Option<Stage> {
        self.queue.pending_stages().into_iter().next()
    }

    pub fn queue(&self) -> &PeekQueue {
        &self.queue
    }

    /// Highest stage resolved in this generation
    pub fn resolved_through(&self) -> Option<Stage> {
        self.resolved.last().copied()
    }

    /// Whether `stage` has been resolved in this generation
    pub fn is_resolved(&self, stage: Stage) -> bool {
        self.resolved.contains(&stage)
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Move recorded diagnostics out of the run
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.take()
    }
}
