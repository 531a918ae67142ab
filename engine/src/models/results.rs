//! Solver output
//!
//! A result set is the read-only output of one solver pass: one balance
//! series per envelope, index-aligned with the time axis. It is stamped with
//! the token of the run that produced it so that a stale pass can never be
//! resolved against a newer run.

use crate::peek::run::RunToken;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Balance series for one envelope, index-aligned with the time axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSeries {
    values: Vec<f64>,
}

impl ResultSeries {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<f64>> for ResultSeries {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

/// All series produced by one solver pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    token: RunToken,
    series: BTreeMap<String, ResultSeries>,
}

impl ResultSet {
    pub fn new(token: RunToken) -> Self {
        Self {
            token,
            series: BTreeMap::new(),
        }
    }

    /// Builder-style insert
    pub fn with_series(mut self, envelope: impl Into<String>, values: Vec<f64>) -> Self {
        self.insert(envelope, values);
        self
    }

    pub fn insert(&mut self, envelope: impl Into<String>, values: Vec<f64>) {
        self.series.insert(envelope.into(), ResultSeries::new(values));
    }

    /// Token of the run this pass belongs to
    pub fn token(&self) -> RunToken {
        self.token
    }

    pub fn get(&self, envelope: &str) -> Option<&ResultSeries> {
        self.series.get(envelope)
    }

    pub fn envelopes(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
