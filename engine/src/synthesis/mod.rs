//! Synthesis strategies
//!
//! Factories that build [`PeekOperation`]s. Every strategy reads settled
//! series from an earlier pass and appends descriptors to one target:
//!
//! - [`at_days`]: caller-supplied builder per day
//! - [`reset_to_zero`] / [`reset_to_target`]: compensating Transfers
//! - [`propagate`]: scaled copy of a source series as Impulses
//! - [`marginal_tax`]: extra tax caused by additional income
//!
//! [`PeekOperation`]: crate::peek::PeekOperation

pub mod at_days;
pub mod propagate;
pub mod reset;
pub mod tax;

pub use at_days::{at_days, AtDays, DayBuilder};
pub use propagate::{propagate, DayFilter, Proportional};
pub use reset::{reset_to_target, reset_to_zero, ResetToTarget, ResetToZero};
pub use tax::{marginal_tax, FilingStatus, MarginalTax, TaxBracket, TaxTable, TaxTableError};
