//! Progressive income tax and marginal tax synthesis
//!
//! # Bracket walk
//!
//! Income is taxed bracket by bracket. Each bracket taxes only the slice of
//! income between the previous bracket's upper threshold and its own, so no
//! slice is taxed twice. The last bracket has no upper threshold.
//!
//! ```text
//! tax(income) = Σ rate_i × clamp(income - lower_i, 0, upper_i - lower_i)
//!             - credit × dependents            (floored at 0)
//! ```
//!
//! Joint filing doubles every threshold; rates are unchanged.

use crate::core::time::Day;
use crate::models::descriptor::{Descriptor, Direction};
use crate::peek::context::StageContext;
use crate::peek::operation::{PeekOperation, Synthesized};
use crate::synthesis::at_days::inject_at_days;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when validating a tax table
#[derive(Debug, Error, PartialEq)]
pub enum TaxTableError {
    #[error("Tax table must contain at least one bracket")]
    Empty,

    #[error("Bracket {index} threshold {upper} must exceed the previous threshold {previous}")]
    NotAscending { index: usize, previous: f64, upper: f64 },

    #[error("Only the last bracket may be open-ended (bracket {index} has no threshold)")]
    OpenBracketNotLast { index: usize },

    #[error("Last bracket must be open-ended")]
    ClosedTopBracket,

    #[error("Bracket {index} rate {rate} must be within [0, 1]")]
    InvalidRate { index: usize, rate: f64 },

    #[error("Dependent credit must be a non-negative finite amount, got {0}")]
    InvalidCredit(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    #[default]
    Single,
    /// Married filing jointly: thresholds doubled
    Joint,
}

impl FilingStatus {
    fn threshold_multiplier(self) -> f64 {
        match self {
            FilingStatus::Single => 1.0,
            FilingStatus::Joint => 2.0,
        }
    }
}

/// One bracket: income up to `upper` (single-filer) taxed at `rate`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Upper threshold, `None` for the open-ended top bracket
    pub upper: Option<f64>,
    pub rate: f64,
}

impl TaxBracket {
    pub fn capped(upper: f64, rate: f64) -> Self {
        Self {
            upper: Some(upper),
            rate,
        }
    }

    pub fn open(rate: f64) -> Self {
        Self { upper: None, rate }
    }
}

/// Validated progressive bracket table
///
/// # Example
/// ```
/// use envelope_peek_core::synthesis::{FilingStatus, TaxTable};
///
/// let table = TaxTable::default();
/// let single = table.tax(40_000.0, FilingStatus::Single, 0);
/// let joint = table.tax(40_000.0, FilingStatus::Joint, 0);
/// assert!(joint < single);
/// assert_eq!(table.tax(-5.0, FilingStatus::Single, 0), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTaxTable")]
pub struct TaxTable {
    brackets: Vec<TaxBracket>,
    /// Credit subtracted per dependent
    dependent_credit: f64,
}

#[derive(Deserialize)]
struct RawTaxTable {
    brackets: Vec<TaxBracket>,
    #[serde(default)]
    dependent_credit: f64,
}

impl TryFrom<RawTaxTable> for TaxTable {
    type Error = TaxTableError;

    fn try_from(raw: RawTaxTable) -> Result<Self, Self::Error> {
        TaxTable::new(raw.brackets, raw.dependent_credit)
    }
}

impl Default for TaxTable {
    fn default() -> Self {
        Self {
            brackets: vec![
                TaxBracket::capped(11_000.0, 0.10),
                TaxBracket::capped(44_725.0, 0.12),
                TaxBracket::capped(95_375.0, 0.22),
                TaxBracket::capped(182_100.0, 0.24),
                TaxBracket::capped(231_250.0, 0.32),
                TaxBracket::capped(578_125.0, 0.35),
                TaxBracket::open(0.37),
            ],
            dependent_credit: 2_000.0,
        }
    }
}

impl TaxTable {
    pub fn new(brackets: Vec<TaxBracket>, dependent_credit: f64) -> Result<Self, TaxTableError> {
        if brackets.is_empty() {
            return Err(TaxTableError::Empty);
        }
        if !dependent_credit.is_finite() || dependent_credit < 0.0 {
            return Err(TaxTableError::InvalidCredit(dependent_credit));
        }

        let last = brackets.len() - 1;
        let mut previous = 0.0;
        for (index, bracket) in brackets.iter().enumerate() {
            if !(0.0..=1.0).contains(&bracket.rate) {
                return Err(TaxTableError::InvalidRate {
                    index,
                    rate: bracket.rate,
                });
            }
            match bracket.upper {
                Some(_) if index == last => return Err(TaxTableError::ClosedTopBracket),
                Some(upper) => {
                    if upper <= previous || !upper.is_finite() {
                        return Err(TaxTableError::NotAscending {
                            index,
                            previous,
                            upper,
                        });
                    }
                    previous = upper;
                }
                None if index != last => {
                    return Err(TaxTableError::OpenBracketNotLast { index });
                }
                None => {}
            }
        }

        Ok(Self {
            brackets,
            dependent_credit,
        })
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    pub fn dependent_credit(&self) -> f64 {
        self.dependent_credit
    }

    /// Upper thresholds of the capped brackets for a filing status
    pub fn thresholds(&self, filing: FilingStatus) -> Vec<f64> {
        let multiplier = filing.threshold_multiplier();
        self.brackets
            .iter()
            .filter_map(|bracket| bracket.upper)
            .map(|upper| upper * multiplier)
            .collect()
    }

    /// Tax owed before credits
    pub fn gross_tax(&self, income: f64, filing: FilingStatus) -> f64 {
        let multiplier = filing.threshold_multiplier();
        let mut tax = 0.0;
        let mut lower = 0.0;

        for bracket in &self.brackets {
            if income <= lower {
                break;
            }
            let upper = bracket.upper.map(|upper| upper * multiplier);
            let top = upper.map_or(income, |upper| income.min(upper));
            tax += (top - lower) * bracket.rate;

            match upper {
                Some(upper) => lower = upper,
                None => break,
            }
        }

        tax
    }

    /// Tax owed after dependent credits, never negative
    pub fn tax(&self, income: f64, filing: FilingStatus, dependents: u32) -> f64 {
        let credit = self.dependent_credit * f64::from(dependents);
        (self.gross_tax(income, filing) - credit).max(0.0)
    }

    /// Extra tax caused by `additional` on top of `taxable`
    pub fn marginal_delta(
        &self,
        taxable: f64,
        additional: f64,
        filing: FilingStatus,
        dependents: u32,
    ) -> f64 {
        self.tax(taxable + additional, filing, dependents) - self.tax(taxable, filing, dependents)
    }
}

/// Parameters for marginal tax synthesis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginalTax {
    /// Envelope holding taxable income before the addition
    pub taxable_source: String,
    /// Envelope holding the additional income
    pub additional_source: String,
    /// Envelope the tax outflows are charged to
    pub taxes_target: String,
    pub days: Vec<Day>,
    #[serde(default)]
    pub filing: FilingStatus,
    #[serde(default)]
    pub dependents: u32,
    #[serde(default)]
    pub table: TaxTable,
}

impl MarginalTax {
    pub fn new(
        taxable_source: impl Into<String>,
        additional_source: impl Into<String>,
        taxes_target: impl Into<String>,
        days: Vec<Day>,
    ) -> Self {
        Self {
            taxable_source: taxable_source.into(),
            additional_source: additional_source.into(),
            taxes_target: taxes_target.into(),
            days,
            filing: FilingStatus::Single,
            dependents: 0,
            table: TaxTable::default(),
        }
    }

    pub fn with_filing(mut self, filing: FilingStatus) -> Self {
        self.filing = filing;
        self
    }

    pub fn with_dependents(mut self, dependents: u32) -> Self {
        self.dependents = dependents;
        self
    }

    pub fn with_table(mut self, table: TaxTable) -> Self {
        self.table = table;
        self
    }

    pub(crate) fn synthesize(&self, ctx: &StageContext<'_>, out: &mut Synthesized) {
        let growth = match ctx.growth_snapshot(&self.taxes_target) {
            Ok(growth) => growth,
            Err(kind) => {
                out.diagnostics.push(kind);
                return;
            }
        };

        inject_at_days(&self.days, out, |day| {
            let taxable = ctx.value_at(&self.taxable_source, day)?;
            let additional = ctx.value_at(&self.additional_source, day)?;
            let delta = self
                .table
                .marginal_delta(taxable, additional, self.filing, self.dependents);
            if delta <= 0.0 {
                return Ok(None);
            }

            Ok(Some(Descriptor::impulse(
                Direction::Outflow,
                day,
                delta,
                growth.clone(),
            )))
        });
    }
}

impl From<MarginalTax> for PeekOperation {
    fn from(op: MarginalTax) -> Self {
        PeekOperation::MarginalTax(op)
    }
}

/// Single-filer marginal tax with the default table and no dependents
pub fn marginal_tax(
    taxable_source: impl Into<String>,
    additional_source: impl Into<String>,
    taxes_target: impl Into<String>,
    days: Vec<Day>,
) -> PeekOperation {
    MarginalTax::new(taxable_source, additional_source, taxes_target, days).into()
}
