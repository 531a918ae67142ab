//! Shared test fixtures
//!
//! `LedgerSolver` is a minimal stand-in for the external solver: a Transfer
//! contributes its signed amount scaled by its growth snapshot from its day
//! onward, an Impulse contributes its signed amount unscaled.

#![allow(dead_code)]

use envelope_peek_core::models::{DescriptorKind, Envelope, EnvelopeSet, GrowthModel, ResultSet};
use envelope_peek_core::orchestrator::{Solver, SolverError};
use envelope_peek_core::{RunToken, TimeAxis};

#[derive(Debug, Default)]
pub struct LedgerSolver {
    pub calls: usize,
}

impl Solver for LedgerSolver {
    fn solve(
        &mut self,
        envelopes: &EnvelopeSet,
        axis: &TimeAxis,
        token: RunToken,
    ) -> Result<ResultSet, SolverError> {
        self.calls += 1;
        Ok(ledger(envelopes, axis, token))
    }
}

/// Balance series for every envelope
pub fn ledger(envelopes: &EnvelopeSet, axis: &TimeAxis, token: RunToken) -> ResultSet {
    let mut results = ResultSet::new(token);
    for envelope in envelopes.iter() {
        let series: Vec<f64> = axis
            .days()
            .iter()
            .map(|&t| {
                envelope
                    .descriptors()
                    .iter()
                    .filter(|d| d.day <= t)
                    .map(|d| match d.kind {
                        DescriptorKind::Transfer => d.signed_amount() * d.growth.factor_after(t - d.day),
                        DescriptorKind::Impulse => d.signed_amount(),
                    })
                    .sum::<f64>()
            })
            .collect();
        results.insert(envelope.name(), series);
    }
    results
}

/// Envelope set with static growth
pub fn plan(names: &[&str]) -> EnvelopeSet {
    EnvelopeSet::from_envelopes(
        names
            .iter()
            .map(|name| Envelope::new(*name, GrowthModel::none()))
            .collect(),
    )
    .unwrap()
}

pub fn monthly_axis(months: i64) -> TimeAxis {
    TimeAxis::stepped(0, 30 * months, 30).unwrap()
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
