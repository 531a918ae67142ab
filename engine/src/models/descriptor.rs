//! Descriptors: the event unit consumed by the solver
//!
//! A descriptor is a declarative, dated balance change. Transfers persist and
//! evolve under their growth snapshot; impulses are one-time changes.

use crate::core::time::{Day, Stage};
use crate::models::growth::GrowthModel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Parameter name carrying an inflow magnitude
pub const INFLOW_PARAM: &str = "a";

/// Parameter name carrying an outflow magnitude
pub const OUTFLOW_PARAM: &str = "b";

/// Rejections when loading a descriptor from serialized form
#[derive(Debug, Error, PartialEq)]
pub enum DescriptorError {
    #[error("Descriptor magnitude must be non-negative, got {0}")]
    NegativeMagnitude(f64),

    #[error("Descriptor magnitude must be finite, got {0}")]
    NonFiniteMagnitude(f64),
}

/// Direction of a balance change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Inflow,
    Outflow,
}

impl Direction {
    /// +1.0 for inflows, -1.0 for outflows
    pub fn sign(self) -> f64 {
        match self {
            Direction::Inflow => 1.0,
            Direction::Outflow => -1.0,
        }
    }

    /// Name of the parameter the magnitude is published under
    pub fn param_key(self) -> &'static str {
        match self {
            Direction::Inflow => INFLOW_PARAM,
            Direction::Outflow => OUTFLOW_PARAM,
        }
    }

    /// Direction that moves a balance by `delta`
    ///
    /// Positive deltas are inflows; negative (and zero) deltas are outflows.
    pub fn for_delta(delta: f64) -> Self {
        if delta > 0.0 {
            Direction::Inflow
        } else {
            Direction::Outflow
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptorKind {
    /// Effect persists and evolves forward under the growth snapshot
    Transfer,
    /// One-time change with no forward growth
    Impulse,
}

/// Where a descriptor came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum Provenance {
    /// Written by the plan author
    #[default]
    Authored,
    /// Appended by a peek operation while resolving `stage`
    Synthesized { stage: Stage },
}

/// A dated balance change
///
/// The magnitude is always non-negative; the sign comes from the direction.
///
/// # Example
/// ```
/// use envelope_peek_core::models::{Descriptor, Direction, GrowthModel};
///
/// let d = Descriptor::transfer(Direction::Outflow, 30, 37.5, GrowthModel::none());
/// assert_eq!(d.signed_amount(), -37.5);
/// assert_eq!(d.parameter("b"), Some(37.5));
/// assert_eq!(d.parameter("a"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDescriptor")]
pub struct Descriptor {
    pub kind: DescriptorKind,
    pub direction: Direction,
    pub day: Day,
    magnitude: f64,
    /// Growth model captured when the descriptor was created
    pub growth: GrowthModel,
    #[serde(default)]
    pub provenance: Provenance,
}

#[derive(Deserialize)]
struct RawDescriptor {
    kind: DescriptorKind,
    direction: Direction,
    day: Day,
    magnitude: f64,
    growth: GrowthModel,
    #[serde(default)]
    provenance: Provenance,
}

impl TryFrom<RawDescriptor> for Descriptor {
    type Error = DescriptorError;

    fn try_from(raw: RawDescriptor) -> Result<Self, Self::Error> {
        if !raw.magnitude.is_finite() {
            return Err(DescriptorError::NonFiniteMagnitude(raw.magnitude));
        }
        // The sign lives in `direction`; a signed magnitude would flip it
        if raw.magnitude < 0.0 {
            return Err(DescriptorError::NegativeMagnitude(raw.magnitude));
        }

        let mut descriptor =
            Descriptor::new(raw.kind, raw.direction, raw.day, raw.magnitude, raw.growth);
        descriptor.provenance = raw.provenance;
        Ok(descriptor)
    }
}

impl Descriptor {
    pub fn new(
        kind: DescriptorKind,
        direction: Direction,
        day: Day,
        magnitude: f64,
        growth: GrowthModel,
    ) -> Self {
        Self {
            kind,
            direction,
            day,
            magnitude: magnitude.abs(),
            growth,
            provenance: Provenance::Authored,
        }
    }

    pub fn transfer(direction: Direction, day: Day, magnitude: f64, growth: GrowthModel) -> Self {
        Self::new(DescriptorKind::Transfer, direction, day, magnitude, growth)
    }

    pub fn impulse(direction: Direction, day: Day, magnitude: f64, growth: GrowthModel) -> Self {
        Self::new(DescriptorKind::Impulse, direction, day, magnitude, growth)
    }

    /// Mark this descriptor as produced while resolving `stage`
    pub fn synthesized_at(mut self, stage: Stage) -> Self {
        self.provenance = Provenance::Synthesized { stage };
        self
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn signed_amount(&self) -> f64 {
        self.direction.sign() * self.magnitude
    }

    pub fn is_synthesized(&self) -> bool {
        matches!(self.provenance, Provenance::Synthesized { .. })
    }

    /// Named parameters this descriptor produces for the solver
    ///
    /// Exactly one entry, keyed by the direction's parameter name.
    pub fn parameters(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([(self.direction.param_key(), self.magnitude)])
    }

    pub fn parameter(&self, key: &str) -> Option<f64> {
        (key == self.direction.param_key()).then_some(self.magnitude)
    }
}
