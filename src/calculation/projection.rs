//! Compound growth projection with inflation discounting.
//!
//! A principal `P` invested at annual rate `r` for `years` years grows to
//! `P * (1 + r)^years`. Dividing by `(1 + i)^years` expresses that value in
//! today's money.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::ProfitBasis;

/// Normalizes a rate that may be given as a percentage.
///
/// A magnitude above 1 is read as a percentage and divided by 100; anything
/// else is already a fraction. Not idempotent for values above 100.
///
/// # Examples
///
/// ```
/// use roundup_engine::calculation::normalize_rate;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(normalize_rate(Decimal::from_str("5.5").unwrap()), Decimal::from_str("0.055").unwrap());
/// assert_eq!(normalize_rate(Decimal::from_str("0.055").unwrap()), Decimal::from_str("0.055").unwrap());
/// assert_eq!(normalize_rate(Decimal::ONE), Decimal::ONE);
/// ```
pub fn normalize_rate(rate: Decimal) -> Decimal {
    if rate.abs() > Decimal::ONE {
        rate / Decimal::ONE_HUNDRED
    } else {
        rate
    }
}

/// Rounds a reported monetary value to two decimal places, halves up.
///
/// A midpoint always moves towards positive infinity, so `-0.005` becomes
/// `0.00` and `-0.015` becomes `-0.01`. A zero result carries no sign.
///
/// # Example
///
/// ```
/// use roundup_engine::calculation::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let dec = |s: &str| Decimal::from_str(s).unwrap();
/// assert_eq!(round_money(dec("86.875")), dec("86.88"));
/// assert_eq!(round_money(dec("44.9449")), dec("44.94"));
/// assert_eq!(round_money(dec("-0.015")), dec("-0.01"));
/// ```
pub fn round_money(value: Decimal) -> Decimal {
    let strategy = if value.is_sign_negative() {
        RoundingStrategy::MidpointTowardZero
    } else {
        RoundingStrategy::MidpointAwayFromZero
    };

    let mut rounded = value.round_dp_with_strategy(2, strategy);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded
}

/// Sums `values`, failing instead of overflowing.
///
/// `what` names the total in the error message.
pub(crate) fn checked_sum<I>(values: I, what: &str) -> EngineResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |total, value| total.checked_add(value))
        .ok_or_else(|| EngineError::CalculationError {
            message: format!("{} overflowed", what),
        })
}

/// Returns the number of years until retirement.
///
/// # Errors
///
/// Returns [`EngineError::InvalidHorizon`] when `age` is past
/// `retirement_age`. The horizon is never clamped.
pub fn horizon_years(age: u32, retirement_age: u32) -> EngineResult<u32> {
    retirement_age
        .checked_sub(age)
        .ok_or(EngineError::InvalidHorizon { age, retirement_age })
}

/// The unrounded outcome of projecting one principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    /// The invested principal.
    pub principal: Decimal,
    /// `principal * (1 + rate)^years`.
    pub future_value: Decimal,
    /// `future_value / (1 + inflation)^years`.
    pub inflation_adjusted: Decimal,
}

impl Projection {
    /// `future_value - principal`.
    pub fn nominal_profit(&self) -> EngineResult<Decimal> {
        difference(self.future_value, self.principal, "nominal profit")
    }

    /// `inflation_adjusted - principal`.
    pub fn real_profit(&self) -> EngineResult<Decimal> {
        difference(self.inflation_adjusted, self.principal, "real profit")
    }

    /// The profit measured on `basis`.
    pub fn profit(&self, basis: ProfitBasis) -> EngineResult<Decimal> {
        match basis {
            ProfitBasis::Nominal => self.nominal_profit(),
            ProfitBasis::InflationAdjusted => self.real_profit(),
        }
    }
}

fn difference(value: Decimal, principal: Decimal, what: &str) -> EngineResult<Decimal> {
    value
        .checked_sub(principal)
        .ok_or_else(|| EngineError::CalculationError {
            message: format!("{} overflowed", what),
        })
}

/// Projects `principal` forward over `years`.
///
/// Both `annual_rate` and `inflation` are passed through
/// [`normalize_rate`] here, exactly once.
///
/// # Errors
///
/// Returns [`EngineError::CalculationError`] if the growth factor overflows
/// or the inflation factor is zero (inflation of -100%).
///
/// # Example
///
/// ```
/// use roundup_engine::calculation::{project, round_money};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let dec = |s: &str| Decimal::from_str(s).unwrap();
/// let projection = project(dec("145"), dec("0.0711"), 31, dec("5.5")).unwrap();
///
/// assert_eq!(round_money(projection.future_value), dec("1219.27"));
/// assert_eq!(round_money(projection.real_profit().unwrap()), dec("86.88"));
/// ```
pub fn project(
    principal: Decimal,
    annual_rate: Decimal,
    years: u32,
    inflation: Decimal,
) -> EngineResult<Projection> {
    let rate = normalize_rate(annual_rate);
    let inflation = normalize_rate(inflation);
    let exponent = i64::from(years);

    let growth = Decimal::ONE
        .checked_add(rate)
        .and_then(|base| base.checked_powi(exponent))
        .ok_or_else(|| overflow("growth factor", rate, years))?;
    let future_value = principal
        .checked_mul(growth)
        .ok_or_else(|| overflow("future value", rate, years))?;

    let deflator = Decimal::ONE
        .checked_add(inflation)
        .and_then(|base| base.checked_powi(exponent))
        .ok_or_else(|| overflow("inflation factor", inflation, years))?;
    let inflation_adjusted =
        future_value
            .checked_div(deflator)
            .ok_or_else(|| EngineError::CalculationError {
                message: format!(
                    "Inflation factor is zero for inflation {}",
                    inflation.normalize()
                ),
            })?;

    Ok(Projection {
        principal,
        future_value,
        inflation_adjusted,
    })
}

fn overflow(what: &str, rate: Decimal, years: u32) -> EngineError {
    EngineError::CalculationError {
        message: format!(
            "{} overflowed for rate {} over {} years",
            what,
            rate.normalize(),
            years
        ),
    }
}
