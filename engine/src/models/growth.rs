//! Growth models
//!
//! A growth model describes how a Transfer's effect evolves after its
//! occurrence day. Envelopes carry a live model; descriptors carry a copy
//! taken when they were created, so later edits to the envelope never
//! reach back into descriptors that already exist.

use serde::{Deserialize, Serialize};

const DAYS_PER_YEAR: f64 = 365.0;

/// Kind of growth applied to a Transfer after its occurrence day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthKind {
    /// Value stays constant
    #[default]
    None,
    /// Simple (non-compounding) annual appreciation
    Appreciation,
    /// Simple annual depreciation, floored at zero
    Depreciation,
    /// Straight-line depreciation to zero over a useful life
    DepreciationByUsefulLife,
    DailyCompound,
    MonthlyCompound,
    YearlyCompound,
}

/// Growth configuration: kind, annual rate, optional useful life
///
/// # Example
/// ```
/// use envelope_peek_core::models::{GrowthKind, GrowthModel};
///
/// let model = GrowthModel::new(GrowthKind::YearlyCompound, 0.10);
/// assert!((model.factor_after(730) - 1.21).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GrowthModel {
    pub kind: GrowthKind,

    /// Annual rate (0.05 = 5 %)
    #[serde(default)]
    pub rate: f64,

    /// Useful life in days, only read by `DepreciationByUsefulLife`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub useful_life_days: Option<u32>,
}

impl GrowthModel {
    pub fn new(kind: GrowthKind, rate: f64) -> Self {
        Self {
            kind,
            rate,
            useful_life_days: None,
        }
    }

    /// A model that never changes value
    pub fn none() -> Self {
        Self::default()
    }

    /// Straight-line depreciation to zero over `days`
    pub fn useful_life(days: u32) -> Self {
        Self {
            kind: GrowthKind::DepreciationByUsefulLife,
            rate: 0.0,
            useful_life_days: Some(days),
        }
    }

    /// True when the model leaves values unchanged over time
    pub fn is_static(&self) -> bool {
        match self.kind {
            GrowthKind::None => true,
            GrowthKind::DepreciationByUsefulLife => self.useful_life_days.is_none(),
            _ => self.rate == 0.0,
        }
    }

    /// Multiplier applied to a Transfer `elapsed_days` after it occurred
    ///
    /// Non-positive elapsed time always yields 1.0.
    pub fn factor_after(&self, elapsed_days: i64) -> f64 {
        if elapsed_days <= 0 {
            return 1.0;
        }
        let t = elapsed_days as f64;

        match self.kind {
            GrowthKind::None => 1.0,
            GrowthKind::Appreciation => 1.0 + self.rate * t / DAYS_PER_YEAR,
            GrowthKind::Depreciation => (1.0 - self.rate * t / DAYS_PER_YEAR).max(0.0),
            GrowthKind::DepreciationByUsefulLife => match self.useful_life_days {
                Some(0) => 0.0,
                Some(life) => (1.0 - t / life as f64).max(0.0),
                None => 1.0,
            },
            GrowthKind::DailyCompound => (1.0 + self.rate / DAYS_PER_YEAR).powf(t),
            GrowthKind::MonthlyCompound => {
                let months = elapsed_days.saturating_mul(12) / 365;
                (1.0 + self.rate / 12.0).powi(whole_periods(months))
            }
            GrowthKind::YearlyCompound => {
                let years = elapsed_days / 365;
                (1.0 + self.rate).powi(whole_periods(years))
            }
        }
    }
}

/// Compounding periods as a `powi` exponent, saturating at `i32::MAX`
fn whole_periods(periods: i64) -> i32 {
    i32::try_from(periods).unwrap_or(i32::MAX)
}
