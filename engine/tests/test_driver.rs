//! Driver integration tests
//!
//! Exercises the full solve/resolve loop against the ledger solver in
//! `common`, including multi-stage chains where each stage reads what the
//! previous stage synthesized.

mod common;

use common::{approx_eq, ledger, monthly_axis, LedgerSolver};
use envelope_peek_core::models::{Envelope, EnvelopeSet, ResultSet};
use envelope_peek_core::orchestrator::{DriverConfig, DriverError, PeekDriver, Solver, SolverError};
use envelope_peek_core::synthesis::{marginal_tax, propagate, reset_to_zero};
use envelope_peek_core::{
    Descriptor, DiagnosticKind, Direction, GrowthModel, PeekRun, RunToken, TimeAxis,
};

// ============================================================================
// Test Helpers
// ============================================================================

const YEAR_END: i64 = 360;

/// Checking goes negative at day 60; income of 60k lands on day 0
fn household() -> EnvelopeSet {
    EnvelopeSet::from_envelopes(vec![
        Envelope::new("checking", GrowthModel::none()).with_descriptors(vec![
            Descriptor::transfer(Direction::Inflow, 0, 1_000.0, GrowthModel::none()),
            Descriptor::transfer(Direction::Outflow, 60, 1_500.0, GrowthModel::none()),
        ]),
        Envelope::new("income", GrowthModel::none()).with_descriptors(vec![Descriptor::transfer(
            Direction::Inflow,
            0,
            60_000.0,
            GrowthModel::none(),
        )]),
        Envelope::new("base", GrowthModel::none()),
        Envelope::new("taxes", GrowthModel::none()),
    ])
    .unwrap()
}

/// Stage 0 computes tax, stage 1 pays it from checking, stage 2 tops checking up
fn enqueue_tax_chain(run: &mut PeekRun) {
    run.enqueue(0, marginal_tax("base", "income", "taxes", vec![YEAR_END]))
        .unwrap();
    run.enqueue(1, propagate("taxes", "checking", 1.0, vec![YEAR_END]))
        .unwrap();
    run.enqueue(2, reset_to_zero("checking", YEAR_END)).unwrap();
}

fn balance(results: &ResultSet, axis: &TimeAxis, envelope: &str, day: i64) -> f64 {
    let index = axis.index_of(day).unwrap();
    results.get(envelope).unwrap().get(index).unwrap()
}

struct FailingSolver;

impl Solver for FailingSolver {
    fn solve(
        &mut self,
        _envelopes: &EnvelopeSet,
        _axis: &TimeAxis,
        _token: RunToken,
    ) -> Result<ResultSet, SolverError> {
        Err(SolverError("matrix is singular".to_string()))
    }
}

// ============================================================================
// Multi-Stage Runs
// ============================================================================

#[test]
fn test_three_stage_chain_resolves_in_order() {
    let axis = monthly_axis(12);
    let mut envelopes = household();
    let mut run = PeekRun::new();
    enqueue_tax_chain(&mut run);

    let mut driver = PeekDriver::new(LedgerSolver::default(), DriverConfig::default());
    let report = driver.run(&mut run, &mut envelopes, &axis).unwrap();

    assert_eq!(report.passes, 4);
    assert_eq!(driver.solver().calls, 4);
    assert_eq!(report.stages_applied, 3);
    assert_eq!(report.operations_applied, 3);
    assert_eq!(report.descriptors_synthesized, 3);
    assert!(!report.has_pending_work());
    assert!(report.diagnostics.is_empty());

    // tax(60_000) = 1_100 + 33_725 × 12 % + 15_275 × 22 %
    let tax = 1_100.0 + 33_725.0 * 0.12 + 15_275.0 * 0.22;
    assert!(approx_eq(balance(&report.results, &axis, "taxes", YEAR_END), -tax));
    assert!(approx_eq(balance(&report.results, &axis, "checking", YEAR_END), 0.0));

    let top_up = &envelopes.get("checking").unwrap().descriptors()[3];
    assert_eq!(top_up.direction, Direction::Inflow);
    assert!(approx_eq(top_up.magnitude(), 500.0 + tax));
}

#[test]
fn test_later_stage_sees_earlier_synthesis() {
    let axis = monthly_axis(12);
    let mut envelopes = household();
    let mut run = PeekRun::new();
    enqueue_tax_chain(&mut run);

    let mut driver = PeekDriver::new(LedgerSolver::default(), DriverConfig::default());
    driver.run(&mut run, &mut envelopes, &axis).unwrap();

    let paid = &envelopes.get("checking").unwrap().descriptors()[2];
    let charged = &envelopes.get("taxes").unwrap().descriptors()[0];
    assert!(approx_eq(paid.magnitude(), charged.magnitude()));
}

#[test]
fn test_empty_queue_stops_after_one_pass() {
    let axis = monthly_axis(3);
    let mut envelopes = household();
    let mut run = PeekRun::new();

    let mut driver = PeekDriver::new(LedgerSolver::default(), DriverConfig::default());
    let report = driver.run(&mut run, &mut envelopes, &axis).unwrap();

    assert_eq!(report.passes, 1);
    assert_eq!(report.stages_applied, 0);
    assert_eq!(envelopes, household());
}

#[test]
fn test_gap_in_stages_leaves_pending_work() {
    let axis = monthly_axis(12);
    let mut envelopes = household();
    let mut run = PeekRun::new();
    run.enqueue(0, reset_to_zero("checking", 90)).unwrap();
    run.enqueue(2, reset_to_zero("checking", 180)).unwrap();

    let mut driver = PeekDriver::new(LedgerSolver::default(), DriverConfig::default());
    let report = driver.run(&mut run, &mut envelopes, &axis).unwrap();

    assert_eq!(report.passes, 2);
    assert_eq!(report.pending_operations, 1);
    assert!(report.has_pending_work());

    let top_up = &envelopes.get("checking").unwrap().descriptors()[2];
    assert_eq!(top_up.day, 90);
    assert_eq!(top_up.direction, Direction::Inflow);
    assert!(approx_eq(top_up.magnitude(), 500.0));
}

#[test]
fn test_stage_limit_is_enforced() {
    let axis = monthly_axis(12);
    let mut envelopes = household();
    let mut run = PeekRun::new();
    enqueue_tax_chain(&mut run);

    let mut driver = PeekDriver::new(LedgerSolver::default(), DriverConfig { max_stages: 2 });
    let err = driver.run(&mut run, &mut envelopes, &axis).unwrap_err();
    assert!(matches!(err, DriverError::StageLimitExceeded { limit: 2 }));
}

#[test]
fn test_stage_limit_allows_exactly_max_stages() {
    let axis = monthly_axis(12);
    let mut envelopes = household();
    let mut run = PeekRun::new();
    enqueue_tax_chain(&mut run);

    let mut driver = PeekDriver::new(LedgerSolver::default(), DriverConfig { max_stages: 3 });
    let report = driver.run(&mut run, &mut envelopes, &axis).unwrap();
    assert_eq!(report.stages_applied, 3);
}

// ============================================================================
// Run Discipline
// ============================================================================

#[test]
fn test_run_must_be_fresh() {
    let axis = monthly_axis(3);
    let mut envelopes = household();
    let mut run = PeekRun::new();
    run.enqueue(0, reset_to_zero("checking", 90)).unwrap();

    let results = ledger(&envelopes, &axis, run.token());
    run.resolve(&mut envelopes, &results, &axis, 0).unwrap();

    let mut driver = PeekDriver::new(LedgerSolver::default(), DriverConfig::default());
    assert!(matches!(
        driver.run(&mut run, &mut envelopes, &axis),
        Err(DriverError::RunNotFresh)
    ));

    run.clear();
    assert!(driver.run(&mut run, &mut envelopes, &axis).is_ok());
}

#[test]
fn test_solver_failure_propagates() {
    let axis = monthly_axis(3);
    let mut envelopes = household();
    let mut run = PeekRun::new();

    let mut driver = PeekDriver::new(FailingSolver, DriverConfig::default());
    let err = driver.run(&mut run, &mut envelopes, &axis).unwrap_err();
    assert!(matches!(err, DriverError::Solver(SolverError(msg)) if msg == "matrix is singular"));
}

#[test]
fn test_report_carries_diagnostics() {
    let axis = monthly_axis(3);
    let mut envelopes = household();
    let mut run = PeekRun::new();
    run.enqueue(0, reset_to_zero("checking", 45)).unwrap();

    let mut driver = PeekDriver::new(LedgerSolver::default(), DriverConfig::default());
    let report = driver.run(&mut run, &mut envelopes, &axis).unwrap();

    assert_eq!(report.stages_applied, 1);
    assert_eq!(report.descriptors_synthesized, 0);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].kind, DiagnosticKind::DayNotInAxis { day: 45 });
    assert!(run.diagnostics().is_empty(), "report takes the diagnostics");
}

#[test]
fn test_identical_plans_produce_identical_hashes() {
    let axis = monthly_axis(12);
    let mut hashes = Vec::new();

    for _ in 0..2 {
        let mut envelopes = household();
        let mut run = PeekRun::new();
        enqueue_tax_chain(&mut run);
        let mut driver = PeekDriver::new(LedgerSolver::default(), DriverConfig::default());
        hashes.push(driver.run(&mut run, &mut envelopes, &axis).unwrap().plan_hash);
    }

    assert_eq!(hashes[0], hashes[1]);
}

#[test]
fn test_driver_config_defaults_from_json() {
    let config: DriverConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, DriverConfig::default());
    assert_eq!(config.max_stages, 32);
}
