//! At-days injector
//!
//! The generic building block behind every strategy: walk a list of days,
//! ask a builder for a descriptor on each, keep the finite ones.

use crate::core::time::Day;
use crate::models::descriptor::Descriptor;
use crate::peek::context::StageContext;
use crate::peek::diagnostics::DiagnosticKind;
use crate::peek::operation::{PeekOperation, Synthesized};
use std::fmt;
use std::sync::Arc;

/// Builds at most one descriptor for a day
pub trait DayBuilder: Send + Sync {
    fn build(&self, day: Day, ctx: &StageContext<'_>) -> Option<Descriptor>;
}

impl<F> DayBuilder for F
where
    F: Fn(Day, &StageContext<'_>) -> Option<Descriptor> + Send + Sync,
{
    fn build(&self, day: Day, ctx: &StageContext<'_>) -> Option<Descriptor> {
        self(day, ctx)
    }
}

/// Caller-defined synthesis over a fixed list of days
#[derive(Clone)]
pub struct AtDays {
    pub target: String,
    pub days: Vec<Day>,
    builder: Arc<dyn DayBuilder>,
}

impl fmt::Debug for AtDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtDays")
            .field("target", &self.target)
            .field("days", &self.days)
            .finish_non_exhaustive()
    }
}

impl AtDays {
    pub(crate) fn synthesize(&self, ctx: &StageContext<'_>, out: &mut Synthesized) {
        inject_at_days(&self.days, out, |day| Ok(self.builder.build(day, ctx)));
    }
}

/// Append one descriptor per day where `builder` produces one
///
/// # Example
/// ```
/// use envelope_peek_core::models::{Descriptor, Direction};
/// use envelope_peek_core::synthesis::at_days;
///
/// let op = at_days("savings", vec![30, 60], |day, ctx| {
///     let growth = ctx.growth_snapshot("savings").ok()?;
///     Some(Descriptor::impulse(Direction::Inflow, day, 50.0, growth))
/// });
/// assert_eq!(op.target(), "savings");
/// ```
pub fn at_days<F>(target: impl Into<String>, days: Vec<Day>, builder: F) -> PeekOperation
where
    F: Fn(Day, &StageContext<'_>) -> Option<Descriptor> + Send + Sync + 'static,
{
    PeekOperation::AtDays(AtDays {
        target: target.into(),
        days,
        builder: Arc::new(builder),
    })
}

/// Shared day loop used by all strategies
///
/// Builder errors and non-finite magnitudes skip that day only.
pub(crate) fn inject_at_days<F>(days: &[Day], out: &mut Synthesized, mut build: F)
where
    F: FnMut(Day) -> Result<Option<Descriptor>, DiagnosticKind>,
{
    for &day in days {
        match build(day) {
            Ok(Some(descriptor)) if descriptor.magnitude().is_finite() => {
                out.descriptors.push(descriptor);
            }
            Ok(Some(descriptor)) => {
                out.diagnostics.push(DiagnosticKind::NonFiniteMagnitude {
                    day,
                    value: descriptor.magnitude(),
                });
            }
            Ok(None) => {}
            Err(kind) => out.diagnostics.push(kind),
        }
    }
}
