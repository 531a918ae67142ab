//! Checkpoint - Save/Restore Envelope Plans
//!
//! Captures an envelope plan (envelopes with every descriptor, plus the time
//! axis) together with a SHA-256 fingerprint.
//!
//! # Critical Invariants
//!
//! - **Determinism**: the same plan always hashes the same, regardless of the
//!   order envelopes were inserted in
//! - **Sensitivity**: appending any descriptor changes the hash
//! - **Integrity**: a snapshot only restores when its contents match its hash

use crate::core::time::{TimeAxis, TimeAxisError};
use crate::models::envelope::{Envelope, EnvelopeSet, PlanError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Plan serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Plan hash mismatch: snapshot says {expected}, contents hash to {actual}")]
    HashMismatch { expected: String, actual: String },

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    TimeAxis(#[from] TimeAxisError),
}

/// Serializable plan with its fingerprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSnapshot {
    pub time_axis: TimeAxis,

    /// Envelopes in name order
    pub envelopes: Vec<Envelope>,

    /// SHA256 of the canonical plan
    pub plan_hash: String,
}

#[derive(Serialize)]
struct PlanView<'a> {
    time_axis: &'a TimeAxis,
    envelopes: &'a EnvelopeSet,
}

impl PlanSnapshot {
    pub fn capture(envelopes: &EnvelopeSet, axis: &TimeAxis) -> Result<Self, CheckpointError> {
        Ok(Self {
            time_axis: axis.clone(),
            envelopes: envelopes.iter().cloned().collect(),
            plan_hash: compute_plan_hash(envelopes, axis)?,
        })
    }

    /// Rebuild the plan, verifying it against the stored hash
    pub fn restore(self) -> Result<(EnvelopeSet, TimeAxis), CheckpointError> {
        let envelopes = EnvelopeSet::from_envelopes(self.envelopes)?;
        let actual = compute_plan_hash(&envelopes, &self.time_axis)?;
        if actual != self.plan_hash {
            return Err(CheckpointError::HashMismatch {
                expected: self.plan_hash,
                actual,
            });
        }
        Ok((envelopes, self.time_axis))
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Fingerprint of a plan
pub fn compute_plan_hash(envelopes: &EnvelopeSet, axis: &TimeAxis) -> Result<String, CheckpointError> {
    compute_hash(&PlanView {
        time_axis: axis,
        envelopes,
    })
}

/// Deterministic SHA256 over canonical JSON (object keys sorted)
pub fn compute_hash<T: Serialize>(value: &T) -> Result<String, CheckpointError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let canonical = canonicalize(serde_json::to_value(value)?);
    let json = serde_json::to_string(&canonical)?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
