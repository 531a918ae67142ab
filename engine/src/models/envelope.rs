//! Envelopes and the envelope set
//!
//! # Critical Invariants
//!
//! 1. **Unique names**: an envelope set never holds two envelopes with the same name
//! 2. **Append-only**: descriptors are only ever pushed, never edited or removed
//! 3. **Deterministic iteration**: envelopes iterate in name order

use crate::models::descriptor::Descriptor;
use crate::models::growth::GrowthModel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised while assembling a plan
#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    #[error("Envelope already exists: {0}")]
    DuplicateEnvelope(String),

    #[error("Envelope not found: {0}")]
    UnknownEnvelope(String),

    #[error("Envelope stored under key {key} is named {name}")]
    NameMismatch { key: String, name: String },
}

/// A named bucket whose balance is derived from its descriptors
///
/// # Example
/// ```
/// use envelope_peek_core::models::{Descriptor, Direction, Envelope, GrowthModel};
///
/// let mut savings = Envelope::new("savings", GrowthModel::none());
/// savings.push(Descriptor::transfer(Direction::Inflow, 0, 1_000.0, GrowthModel::none()));
/// assert_eq!(savings.descriptors().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    name: String,
    growth: GrowthModel,
    #[serde(default)]
    descriptors: Vec<Descriptor>,
}

impl Envelope {
    pub fn new(name: impl Into<String>, growth: GrowthModel) -> Self {
        Self {
            name: name.into(),
            growth,
            descriptors: Vec::new(),
        }
    }

    pub fn with_descriptors(mut self, descriptors: Vec<Descriptor>) -> Self {
        self.descriptors.extend(descriptors);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Live growth configuration
    pub fn growth(&self) -> &GrowthModel {
        &self.growth
    }

    /// Replace the live growth configuration
    ///
    /// Descriptors already on the envelope keep their own snapshot.
    pub fn set_growth(&mut self, growth: GrowthModel) {
        self.growth = growth;
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    pub fn push(&mut self, descriptor: Descriptor) {
        self.descriptors.push(descriptor);
    }

    pub fn synthesized_count(&self) -> usize {
        self.descriptors.iter().filter(|d| d.is_synthesized()).count()
    }
}

/// All envelopes of a plan, keyed by name
///
/// Serialized as a map from name to envelope. Loading goes through
/// [`EnvelopeSet::insert`], so every key must equal its envelope's name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Envelope>",
    into = "BTreeMap<String, Envelope>"
)]
pub struct EnvelopeSet {
    envelopes: BTreeMap<String, Envelope>,
}

impl TryFrom<BTreeMap<String, Envelope>> for EnvelopeSet {
    type Error = PlanError;

    fn try_from(map: BTreeMap<String, Envelope>) -> Result<Self, Self::Error> {
        let mut set = Self::new();
        for (key, envelope) in map {
            if key != envelope.name() {
                return Err(PlanError::NameMismatch {
                    key,
                    name: envelope.name().to_string(),
                });
            }
            set.insert(envelope)?;
        }
        Ok(set)
    }
}

impl From<EnvelopeSet> for BTreeMap<String, Envelope> {
    fn from(set: EnvelopeSet) -> Self {
        set.envelopes
    }
}

impl EnvelopeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set, rejecting duplicate names
    pub fn from_envelopes(envelopes: Vec<Envelope>) -> Result<Self, PlanError> {
        let mut set = Self::new();
        for envelope in envelopes {
            set.insert(envelope)?;
        }
        Ok(set)
    }

    pub fn insert(&mut self, envelope: Envelope) -> Result<(), PlanError> {
        if self.envelopes.contains_key(envelope.name()) {
            return Err(PlanError::DuplicateEnvelope(envelope.name().to_string()));
        }
        self.envelopes.insert(envelope.name().to_string(), envelope);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Envelope> {
        self.envelopes.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Envelope> {
        self.envelopes.get_mut(name)
    }

    /// Mutable lookup that reports unknown names as an error
    pub fn require_mut(&mut self, name: &str) -> Result<&mut Envelope, PlanError> {
        self.envelopes
            .get_mut(name)
            .ok_or_else(|| PlanError::UnknownEnvelope(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.envelopes.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.envelopes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Envelope> {
        self.envelopes.values()
    }

    pub fn len(&self) -> usize {
        self.envelopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.envelopes.is_empty()
    }

    pub fn total_descriptors(&self) -> usize {
        self.iter().map(|e| e.descriptors().len()).sum()
    }

    pub fn total_synthesized(&self) -> usize {
        self.iter().map(Envelope::synthesized_count).sum()
    }
}
