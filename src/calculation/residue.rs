//! Ceiling and remanent computation.
//!
//! Every expense is rounded up to the next multiple of the ceiling step;
//! the difference is the amount notionally saved.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The ceiling and remanent of one amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Residue {
    /// The amount rounded up to the step.
    pub ceiling: Decimal,
    /// `ceiling - amount`, in `[0, step)`.
    pub remanent: Decimal,
}

/// Rounds `amount` up to the next multiple of `step`.
///
/// Multiples of `step` map to themselves. Negative amounts round towards
/// zero, which is "up" for them. A zero step leaves the amount unchanged.
/// Returns `None` when the rounded value is outside the decimal range.
///
/// # Examples
///
/// ```
/// use roundup_engine::calculation::ceiling;
/// use rust_decimal::Decimal;
///
/// let step = Decimal::from(100);
/// assert_eq!(ceiling(Decimal::from(1519), step), Some(Decimal::from(1600)));
/// assert_eq!(ceiling(Decimal::from(1500), step), Some(Decimal::from(1500)));
/// assert_eq!(ceiling(Decimal::new(1, 2), step), Some(Decimal::from(100)));
/// assert_eq!(ceiling(Decimal::MAX, step), None);
/// ```
pub fn ceiling(amount: Decimal, step: Decimal) -> Option<Decimal> {
    let remainder = amount.checked_rem(step).unwrap_or(Decimal::ZERO);

    if remainder.is_zero() {
        Some(amount)
    } else if remainder.is_sign_positive() {
        amount.checked_add(step - remainder)
    } else {
        amount.checked_sub(remainder)
    }
}

/// Computes the ceiling and remanent of `amount`.
///
/// # Errors
///
/// Returns [`EngineError::CalculationError`] if `amount` cannot be rounded
/// up without leaving the decimal range.
///
/// # Example
///
/// ```
/// use roundup_engine::calculation::compute_residue;
/// use rust_decimal::Decimal;
///
/// let residue = compute_residue(Decimal::from(1), Decimal::from(100)).unwrap();
/// assert_eq!(residue.ceiling, Decimal::from(100));
/// assert_eq!(residue.remanent, Decimal::from(99));
/// ```
pub fn compute_residue(amount: Decimal, step: Decimal) -> EngineResult<Residue> {
    let ceiling = ceiling(amount, step).ok_or_else(|| EngineError::CalculationError {
        message: format!(
            "Amount {} cannot be rounded up to a multiple of {}",
            amount.normalize(),
            step.normalize()
        ),
    })?;

    Ok(Residue {
        ceiling,
        remanent: ceiling - amount,
    })
}
