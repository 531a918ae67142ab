//! Plan checkpoint tests
//!
//! Covers plan fingerprinting and snapshot restore.

mod common;

use common::{monthly_axis, plan};
use envelope_peek_core::models::{Envelope, EnvelopeSet, ResultSet};
use envelope_peek_core::orchestrator::{compute_plan_hash, CheckpointError, PlanSnapshot};
use envelope_peek_core::synthesis::reset_to_zero;
use envelope_peek_core::{Descriptor, Direction, GrowthKind, GrowthModel, PeekRun};

fn sample_plan() -> EnvelopeSet {
    EnvelopeSet::from_envelopes(vec![
        Envelope::new("brokerage", GrowthModel::new(GrowthKind::DailyCompound, 0.06)).with_descriptors(
            vec![Descriptor::transfer(
                Direction::Inflow,
                0,
                25_000.0,
                GrowthModel::new(GrowthKind::DailyCompound, 0.06),
            )],
        ),
        Envelope::new("car", GrowthModel::useful_life(3_650)),
        Envelope::new("checking", GrowthModel::none()),
    ])
    .unwrap()
}

#[test]
fn test_hash_ignores_insertion_order() {
    let axis = monthly_axis(6);
    let forward = plan(&["a", "b", "c"]);
    let backward = plan(&["c", "b", "a"]);

    assert_eq!(
        compute_plan_hash(&forward, &axis).unwrap(),
        compute_plan_hash(&backward, &axis).unwrap()
    );
}

#[test]
fn test_hash_changes_when_descriptor_appended() {
    let axis = monthly_axis(6);
    let mut envelopes = sample_plan();
    let before = compute_plan_hash(&envelopes, &axis).unwrap();

    let mut run = PeekRun::new();
    run.enqueue(0, reset_to_zero("checking", 30)).unwrap();
    let results = ResultSet::new(run.token())
        .with_series("brokerage", vec![0.0; axis.len()])
        .with_series("car", vec![0.0; axis.len()])
        .with_series("checking", vec![0.0, 42.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    run.resolve(&mut envelopes, &results, &axis, 0).unwrap();

    let after = compute_plan_hash(&envelopes, &axis).unwrap();
    assert_ne!(before, after);
}

#[test]
fn test_hash_changes_with_axis() {
    let envelopes = sample_plan();
    assert_ne!(
        compute_plan_hash(&envelopes, &monthly_axis(6)).unwrap(),
        compute_plan_hash(&envelopes, &monthly_axis(7)).unwrap()
    );
}

#[test]
fn test_snapshot_round_trips_through_json() {
    let axis = monthly_axis(12);
    let envelopes = sample_plan();

    let snapshot = PlanSnapshot::capture(&envelopes, &axis).unwrap();
    let json = snapshot.to_json().unwrap();
    let (restored, restored_axis) = PlanSnapshot::from_json(&json).unwrap().restore().unwrap();

    assert_eq!(restored, envelopes);
    assert_eq!(restored_axis, axis);
}

#[test]
fn test_tampered_snapshot_is_rejected() {
    let axis = monthly_axis(12);
    let mut snapshot = PlanSnapshot::capture(&sample_plan(), &axis).unwrap();
    snapshot.envelopes[0].push(Descriptor::impulse(
        Direction::Outflow,
        30,
        1.0,
        GrowthModel::none(),
    ));

    assert!(matches!(
        snapshot.restore(),
        Err(CheckpointError::HashMismatch { .. })
    ));
}

#[test]
fn test_duplicate_envelope_in_snapshot_is_rejected() {
    let axis = monthly_axis(1);
    let mut snapshot = PlanSnapshot::capture(&plan(&["cash"]), &axis).unwrap();
    snapshot.envelopes.push(Envelope::new("cash", GrowthModel::none()));

    assert!(matches!(snapshot.restore(), Err(CheckpointError::Plan(_))));
}

#[test]
fn test_snapshot_with_negative_magnitude_is_rejected() {
    let axis = monthly_axis(12);
    let snapshot = PlanSnapshot::capture(&sample_plan(), &axis).unwrap();
    let mut value = serde_json::to_value(&snapshot).unwrap();
    value["envelopes"][0]["descriptors"][0]["magnitude"] = serde_json::json!(-25_000.0);

    assert!(matches!(
        PlanSnapshot::from_json(&value.to_string()),
        Err(CheckpointError::Serialization(_))
    ));
}
