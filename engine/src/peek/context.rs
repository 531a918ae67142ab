//! Read-only view handed to peek operations during a stage resolution
//!
//! The context is assembled fresh for every resolve call from the envelope
//! set, the solver's result set, and a day→index map built from the axis.

use crate::core::time::{Day, DayIndex, Stage, TimeAxis};
use crate::models::envelope::{Envelope, EnvelopeSet};
use crate::models::growth::GrowthModel;
use crate::models::results::{ResultSeries, ResultSet};
use crate::peek::diagnostics::DiagnosticKind;

pub struct StageContext<'a> {
    stage: Stage,
    envelopes: &'a EnvelopeSet,
    results: &'a ResultSet,
    axis: &'a TimeAxis,
    day_index: &'a DayIndex,
}

impl<'a> StageContext<'a> {
    pub fn new(
        stage: Stage,
        envelopes: &'a EnvelopeSet,
        results: &'a ResultSet,
        axis: &'a TimeAxis,
        day_index: &'a DayIndex,
    ) -> Self {
        Self {
            stage,
            envelopes,
            results,
            axis,
            day_index,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn axis(&self) -> &TimeAxis {
        self.axis
    }

    pub fn envelope(&self, name: &str) -> Option<&Envelope> {
        self.envelopes.get(name)
    }

    /// Copy of the envelope's live growth model, taken now
    pub fn growth_snapshot(&self, name: &str) -> Result<GrowthModel, DiagnosticKind> {
        self.envelope(name)
            .map(|envelope| envelope.growth().clone())
            .ok_or_else(|| DiagnosticKind::MissingEnvelope {
                envelope: name.to_string(),
            })
    }

    pub fn series(&self, name: &str) -> Option<&ResultSeries> {
        self.results.get(name)
    }

    pub fn index_of(&self, day: Day) -> Option<usize> {
        self.day_index.get(day)
    }

    /// Simulated balance of `envelope` on `day`
    ///
    /// Fails when the day is off-axis, the series is missing or misaligned,
    /// or the stored value is not finite.
    pub fn value_at(&self, envelope: &str, day: Day) -> Result<f64, DiagnosticKind> {
        let series = self
            .series(envelope)
            .ok_or_else(|| DiagnosticKind::MissingSeries {
                envelope: envelope.to_string(),
            })?;

        if series.len() != self.axis.len() {
            return Err(DiagnosticKind::SeriesLengthMismatch {
                envelope: envelope.to_string(),
                expected: self.axis.len(),
                actual: series.len(),
            });
        }

        let index = self
            .index_of(day)
            .ok_or(DiagnosticKind::DayNotInAxis { day })?;

        // Length was checked against the axis above
        let value = series.values()[index];
        if !value.is_finite() {
            return Err(DiagnosticKind::NonFiniteValue {
                envelope: envelope.to_string(),
                day,
                value,
            });
        }

        Ok(value)
    }
}
