//! Stage-tagged queue of deferred operations
//!
//! The queue is append-only from the outside. Entries leave it only through
//! [`PeekQueue::take_stage`], which removes every entry of one stage in a
//! single step and hands them back in insertion order.

use crate::core::time::Stage;
use crate::peek::operation::PeekOperation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identifier assigned to an operation when it is enqueued
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(pub u64);

/// An operation together with the stage it waits for
#[derive(Debug, Clone)]
pub struct StagedOperation {
    pub id: OperationId,
    pub stage: Stage,
    pub operation: PeekOperation,
}

#[derive(Debug, Default)]
pub struct PeekQueue {
    entries: Vec<StagedOperation>,
}

impl PeekQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: StagedOperation) {
        self.entries.push(entry);
    }

    /// Remove and return every entry tagged `stage`, in insertion order
    ///
    /// Entries of other stages keep their relative order.
    pub fn take_stage(&mut self, stage: Stage) -> Vec<StagedOperation> {
        if !self.entries.iter().any(|entry| entry.stage == stage) {
            return Vec::new();
        }

        let (selected, remaining): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|entry| entry.stage == stage);
        self.entries = remaining;
        selected
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count_in_stage(&self, stage: Stage) -> usize {
        self.entries.iter().filter(|entry| entry.stage == stage).count()
    }

    /// Distinct stages that still have queued work, ascending
    pub fn pending_stages(&self) -> BTreeSet<Stage> {
        self.entries.iter().map(|entry| entry.stage).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StagedOperation> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
