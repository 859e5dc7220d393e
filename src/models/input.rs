//! Inputs of the filter, returns and standalone projection call paths.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AdditionPeriod, Expense, OverridePeriod, ReportingWindow};

/// Expenses plus the three rule families of one call.
///
/// # Example
///
/// ```
/// use roundup_engine::models::{Expense, FilterInput, ReportingWindow};
/// use rust_decimal::Decimal;
///
/// let input = FilterInput {
///     expenses: vec![Expense::new("2021-10-01 20:15:00", Decimal::from(1519))],
///     windows: vec![ReportingWindow {
///         start: "2021-10-01 00:00:00".to_string(),
///         end: "2021-10-31 23:59:59".to_string(),
///     }],
///     ..Default::default()
/// };
/// assert!(input.overrides.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterInput {
    /// Raw expenses in input order.
    pub expenses: Vec<Expense>,
    /// Override periods (q).
    #[serde(default)]
    pub overrides: Vec<OverridePeriod>,
    /// Addition periods (p).
    #[serde(default)]
    pub additions: Vec<AdditionPeriod>,
    /// Reporting windows (k).
    #[serde(default)]
    pub windows: Vec<ReportingWindow>,
}

/// A filter input plus the scalars needed to project returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnsInput {
    /// Expenses and rules.
    #[serde(flatten)]
    pub periods: FilterInput,
    /// Age in whole years.
    pub age: u32,
    /// Annual income.
    pub wage: Decimal,
    /// Annual inflation, as a fraction or a percentage.
    pub inflation: Decimal,
}

/// A directly invested amount to project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandaloneInput {
    /// The principal.
    pub invested: Decimal,
    /// Age in whole years.
    pub age: u32,
    /// Annual income; without it no tax benefit is computed.
    #[serde(default)]
    pub wage: Option<Decimal>,
    /// Annual inflation, as a fraction or a percentage.
    pub inflation: Decimal,
}
