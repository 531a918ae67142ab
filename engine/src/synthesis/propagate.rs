//! Proportional propagation
//!
//! Scales a source envelope's simulated series by a coefficient and writes
//! the result into a target envelope as one Impulse per admitted day.
//! Typical use: a fixed share of income routed to savings, or a fee charged
//! as a percentage of a balance.

use crate::core::time::Day;
use crate::models::descriptor::{Descriptor, Direction};
use crate::peek::context::StageContext;
use crate::peek::operation::{PeekOperation, Synthesized};
use crate::synthesis::at_days::inject_at_days;
use serde::{Deserialize, Serialize};

/// Predicate on day values deciding which days propagate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DayFilter {
    /// Every listed day
    #[default]
    All,

    OnOrAfter { day: Day },

    Before { day: Day },

    /// `start <= day < end`
    Between { start: Day, end: Day },

    /// Days on a fixed cadence from `anchor`
    Every { anchor: Day, interval: Day },
}

impl DayFilter {
    pub fn admits(&self, day: Day) -> bool {
        match *self {
            DayFilter::All => true,
            DayFilter::OnOrAfter { day: from } => day >= from,
            DayFilter::Before { day: until } => day < until,
            DayFilter::Between { start, end } => day >= start && day < end,
            DayFilter::Every { anchor, interval } => {
                interval > 0 && day >= anchor && (day - anchor) % interval == 0
            }
        }
    }
}

/// Parameters for proportional propagation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proportional {
    pub source: String,
    pub target: String,
    pub coefficient: f64,
    pub days: Vec<Day>,
    #[serde(default)]
    pub filter: DayFilter,
    #[serde(default = "default_direction")]
    pub direction: Direction,
}

fn default_direction() -> Direction {
    Direction::Outflow
}

impl Proportional {
    /// Outflow propagation over every listed day
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        coefficient: f64,
        days: Vec<Day>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            coefficient,
            days,
            filter: DayFilter::All,
            direction: default_direction(),
        }
    }

    pub fn with_filter(mut self, filter: DayFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub(crate) fn synthesize(&self, ctx: &StageContext<'_>, out: &mut Synthesized) {
        let growth = match ctx.growth_snapshot(&self.target) {
            Ok(growth) => growth,
            Err(kind) => {
                out.diagnostics.push(kind);
                return;
            }
        };

        let admitted: Vec<Day> = self
            .days
            .iter()
            .copied()
            .filter(|day| self.filter.admits(*day))
            .collect();

        inject_at_days(&admitted, out, |day| {
            let amount = ctx.value_at(&self.source, day)? * self.coefficient;
            if amount == 0.0 {
                return Ok(None);
            }

            Ok(Some(Descriptor::impulse(
                self.direction,
                day,
                amount.abs(),
                growth.clone(),
            )))
        });
    }
}

impl From<Proportional> for PeekOperation {
    fn from(op: Proportional) -> Self {
        PeekOperation::Proportional(op)
    }
}

/// Outflow impulses of `|source × coefficient|` into `target` on each day
///
/// Use [`Proportional`] directly for a day filter or an inflow direction.
pub fn propagate(
    source: impl Into<String>,
    target: impl Into<String>,
    coefficient: f64,
    days: Vec<Day>,
) -> PeekOperation {
    Proportional::new(source, target, coefficient, days).into()
}
