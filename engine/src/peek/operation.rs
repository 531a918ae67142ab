//! Peek operations
//!
//! One variant per synthesis strategy. Each variant carries its own parameter
//! record, writes to exactly one target envelope, and only ever appends.

use crate::models::descriptor::Descriptor;
use crate::peek::context::StageContext;
use crate::peek::diagnostics::DiagnosticKind;
use crate::synthesis::at_days::AtDays;
use crate::synthesis::propagate::Proportional;
use crate::synthesis::reset::{ResetToTarget, ResetToZero};
use crate::synthesis::tax::MarginalTax;

/// A deferred synthesis step, waiting in the queue for its stage
#[derive(Debug, Clone)]
pub enum PeekOperation {
    /// Caller-supplied builder run once per listed day
    AtDays(AtDays),

    /// Cancel the target's balance on one day
    ResetToZero(ResetToZero),

    /// Move the target's balance to a fixed value on one day
    ResetToTarget(ResetToTarget),

    /// Mirror a scaled source series into the target as impulses
    Proportional(Proportional),

    /// Charge the extra tax caused by additional income
    MarginalTax(MarginalTax),
}

/// Output of applying one operation
#[derive(Debug, Default)]
pub struct Synthesized {
    /// Descriptors to append to the target, in order
    pub descriptors: Vec<Descriptor>,
    /// Days or inputs that were skipped
    pub diagnostics: Vec<DiagnosticKind>,
}

impl PeekOperation {
    /// Envelope this operation appends to
    pub fn target(&self) -> &str {
        match self {
            PeekOperation::AtDays(op) => &op.target,
            PeekOperation::ResetToZero(op) => &op.target,
            PeekOperation::ResetToTarget(op) => &op.target,
            PeekOperation::Proportional(op) => &op.target,
            PeekOperation::MarginalTax(op) => &op.taxes_target,
        }
    }

    /// Short strategy name used in logs
    pub fn strategy(&self) -> &'static str {
        match self {
            PeekOperation::AtDays(_) => "at_days",
            PeekOperation::ResetToZero(_) => "reset_to_zero",
            PeekOperation::ResetToTarget(_) => "reset_to_target",
            PeekOperation::Proportional(_) => "proportional",
            PeekOperation::MarginalTax(_) => "marginal_tax",
        }
    }

    /// Compute the descriptors this operation contributes
    ///
    /// Reads only `ctx`; the caller appends the result to [`Self::target`].
    pub fn apply(&self, ctx: &StageContext<'_>) -> Synthesized {
        let mut out = Synthesized::default();

        if ctx.envelope(self.target()).is_none() {
            out.diagnostics.push(DiagnosticKind::MissingEnvelope {
                envelope: self.target().to_string(),
            });
            return out;
        }

        match self {
            PeekOperation::AtDays(op) => op.synthesize(ctx, &mut out),
            PeekOperation::ResetToZero(op) => op.synthesize(ctx, &mut out),
            PeekOperation::ResetToTarget(op) => op.synthesize(ctx, &mut out),
            PeekOperation::Proportional(op) => op.synthesize(ctx, &mut out),
            PeekOperation::MarginalTax(op) => op.synthesize(ctx, &mut out),
        }

        out
    }
}
