//! Time axis for the simulation
//!
//! All balance series are index-aligned with a single ascending axis of
//! integer day offsets. This module owns that axis and the day→index lookup
//! that stage resolution builds from it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Integer day offset from the start of the plan
pub type Day = i64;

/// Pass number in the solve/resolve loop
pub type Stage = u32;

/// Errors raised while building a time axis
#[derive(Debug, Error, PartialEq)]
pub enum TimeAxisError {
    #[error("Time axis must contain at least one day")]
    Empty,

    #[error("Time axis must be strictly ascending: day {day} at index {index} follows {previous}")]
    NotAscending {
        index: usize,
        previous: Day,
        day: Day,
    },

    #[error("Time axis step must be positive, got {step}")]
    InvalidStep { step: Day },
}

/// Ascending, duplicate-free sequence of day offsets
///
/// # Example
/// ```
/// use envelope_peek_core::TimeAxis;
///
/// let axis = TimeAxis::new(vec![0, 30, 60]).unwrap();
/// assert_eq!(axis.len(), 3);
/// assert_eq!(axis.index_of(30), Some(1));
/// assert_eq!(axis.index_of(31), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Day>", into = "Vec<Day>")]
pub struct TimeAxis {
    days: Vec<Day>,
}

impl TimeAxis {
    /// Create an axis, validating ordering and uniqueness
    pub fn new(days: Vec<Day>) -> Result<Self, TimeAxisError> {
        if days.is_empty() {
            return Err(TimeAxisError::Empty);
        }

        for (index, pair) in days.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(TimeAxisError::NotAscending {
                    index: index + 1,
                    previous: pair[0],
                    day: pair[1],
                });
            }
        }

        Ok(Self { days })
    }

    /// Build an evenly spaced axis covering `start..=end`
    ///
    /// # Example
    /// ```
    /// use envelope_peek_core::TimeAxis;
    ///
    /// let axis = TimeAxis::stepped(0, 90, 30).unwrap();
    /// assert_eq!(axis.days(), &[0, 30, 60, 90]);
    /// ```
    pub fn stepped(start: Day, end: Day, step: Day) -> Result<Self, TimeAxisError> {
        if step <= 0 {
            return Err(TimeAxisError::InvalidStep { step });
        }

        let mut days = Vec::new();
        let mut next = Some(start);
        while let Some(day) = next.filter(|day| *day <= end) {
            days.push(day);
            next = day.checked_add(step);
        }

        Self::new(days)
    }

    pub fn days(&self) -> &[Day] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Always false for a constructed axis; present for API symmetry
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn first_day(&self) -> Day {
        self.days[0]
    }

    pub fn last_day(&self) -> Day {
        self.days[self.days.len() - 1]
    }

    /// Index of `day` on the axis, if present
    pub fn index_of(&self, day: Day) -> Option<usize> {
        self.days.binary_search(&day).ok()
    }

    /// Build a fresh day→index lookup
    ///
    /// Called once per stage resolution. The result is never cached on the
    /// axis because the axis is not guaranteed to be the same across a run.
    pub fn day_index(&self) -> DayIndex {
        DayIndex {
            positions: self
                .days
                .iter()
                .enumerate()
                .map(|(index, day)| (*day, index))
                .collect(),
        }
    }
}

impl TryFrom<Vec<Day>> for TimeAxis {
    type Error = TimeAxisError;

    fn try_from(days: Vec<Day>) -> Result<Self, Self::Error> {
        Self::new(days)
    }
}

impl From<TimeAxis> for Vec<Day> {
    fn from(axis: TimeAxis) -> Self {
        axis.days
    }
}

/// Day→index lookup built for a single stage resolution
#[derive(Debug, Clone, Default)]
pub struct DayIndex {
    positions: HashMap<Day, usize>,
}

impl DayIndex {
    pub fn get(&self, day: Day) -> Option<usize> {
        self.positions.get(&day).copied()
    }

    pub fn contains(&self, day: Day) -> bool {
        self.positions.contains_key(&day)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
