//! Compensation strategies
//!
//! Both strategies read the target envelope's own simulated balance on one
//! day and append a single Transfer that moves it to a goal: zero for
//! [`ResetToZero`], a fixed value for [`ResetToTarget`]. The Transfer carries
//! the target's growth model as it stands when the operation is applied.

use crate::core::time::Day;
use crate::models::descriptor::{Descriptor, Direction};
use crate::peek::context::StageContext;
use crate::peek::operation::{PeekOperation, Synthesized};
use crate::synthesis::at_days::inject_at_days;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResetToZero {
    pub target: String,
    pub day: Day,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResetToTarget {
    pub target: String,
    pub day: Day,
    /// Balance the target should hold after compensation
    pub target_balance: f64,
}

impl ResetToZero {
    pub(crate) fn synthesize(&self, ctx: &StageContext<'_>, out: &mut Synthesized) {
        compensate(ctx, &self.target, self.day, 0.0, out);
    }
}

impl ResetToTarget {
    pub(crate) fn synthesize(&self, ctx: &StageContext<'_>, out: &mut Synthesized) {
        compensate(ctx, &self.target, self.day, self.target_balance, out);
    }
}

/// Cancel the target's simulated balance on `day`
///
/// A positive balance produces an outflow, a negative one an inflow. An
/// exactly-zero balance produces nothing.
pub fn reset_to_zero(target: impl Into<String>, day: Day) -> PeekOperation {
    PeekOperation::ResetToZero(ResetToZero {
        target: target.into(),
        day,
    })
}

/// Bring the target's simulated balance to `target_balance` on `day`
///
/// # Example
/// ```
/// use envelope_peek_core::synthesis::reset_to_target;
///
/// let op = reset_to_target("emergency_fund", 365, 10_000.0);
/// assert_eq!(op.strategy(), "reset_to_target");
/// ```
pub fn reset_to_target(target: impl Into<String>, day: Day, target_balance: f64) -> PeekOperation {
    PeekOperation::ResetToTarget(ResetToTarget {
        target: target.into(),
        day,
        target_balance,
    })
}

fn compensate(ctx: &StageContext<'_>, target: &str, day: Day, goal: f64, out: &mut Synthesized) {
    let growth = match ctx.growth_snapshot(target) {
        Ok(growth) => growth,
        Err(kind) => {
            out.diagnostics.push(kind);
            return;
        }
    };

    inject_at_days(&[day], out, |day| {
        let current = ctx.value_at(target, day)?;
        let delta = goal - current;
        if delta == 0.0 {
            return Ok(None);
        }

        Ok(Some(Descriptor::transfer(
            Direction::for_delta(delta),
            day,
            delta.abs(),
            growth.clone(),
        )))
    });
}
