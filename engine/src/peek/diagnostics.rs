//! Per-run diagnostics channel
//!
//! Malformed inputs met while synthesizing (a day missing from the axis, a
//! NaN balance, an unknown envelope) skip only the affected day or operation
//! and are recorded here instead of aborting the run. Every entry is also
//! emitted as a `tracing` warning.

use crate::core::time::{Day, Stage};
use crate::peek::queue::OperationId;
use serde::Serialize;
use tracing::warn;

/// What went wrong while synthesizing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Requested day is not on the time axis
    DayNotInAxis { day: Day },

    /// Envelope named by the operation does not exist
    MissingEnvelope { envelope: String },

    /// Solver produced no series for the envelope
    MissingSeries { envelope: String },

    /// Series length disagrees with the time axis
    SeriesLengthMismatch {
        envelope: String,
        expected: usize,
        actual: usize,
    },

    /// Upstream series value is NaN or infinite
    NonFiniteValue { envelope: String, day: Day, value: f64 },

    /// Computed magnitude is NaN or infinite
    NonFiniteMagnitude { day: Day, value: f64 },
}

/// One recorded diagnostic
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub stage: Stage,
    pub operation: OperationId,
    /// Envelope the operation writes to
    pub target: String,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

/// Accumulated diagnostics for one run
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, diagnostic: Diagnostic) {
        warn!(
            stage = diagnostic.stage,
            operation = diagnostic.operation.0,
            envelope = %diagnostic.target,
            kind = ?diagnostic.kind,
            "peek synthesis skipped"
        );
        self.entries.push(diagnostic);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn for_stage(&self, stage: Stage) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.stage == stage)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Move all entries out, leaving the channel empty
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.entries)
    }
}
