//! Expense admissibility checks.
//!
//! Each expense is checked in a fixed order and the first failing check
//! becomes its [`RejectionReason`]:
//!
//! 1. amount below zero
//! 2. amount at or above the configured maximum
//! 3. date missing, empty, or not a valid instant (strict parse)
//! 4. date text already accepted earlier in the same call
//!
//! Accepted expenses get their ceiling and remanent.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::config::Limits;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AdditionPeriod, Expense, NumericPolicy, OverridePeriod, RecordOutcome, RejectedRecord,
    RejectionReason, ValidatedRecord,
};

use super::date_parser::parse_strict;
use super::residue::compute_residue;

/// Classifies every expense, in input order.
///
/// Duplicate tracking is keyed on the raw date text and scoped to this
/// call; only accepted dates are remembered, so the first valid occurrence
/// always wins.
///
/// # Errors
///
/// Returns [`EngineError::CalculationError`] if an accepted amount cannot
/// be rounded up to the ceiling step.
///
/// # Example
///
/// ```
/// use roundup_engine::calculation::classify_expenses;
/// use roundup_engine::config::EngineConfig;
/// use roundup_engine::models::{Expense, RecordOutcome, RejectionReason};
/// use rust_decimal::Decimal;
///
/// let config = EngineConfig::default();
/// let expenses = vec![
///     Expense::new("2023-02-28 15:49:20", Decimal::from(375)),
///     Expense::new("2023-12-17 08:09:45", Decimal::from(-480)),
/// ];
///
/// let outcomes = classify_expenses(&expenses, config.limits()).unwrap();
/// assert!(matches!(outcomes[0], RecordOutcome::Accepted(_)));
/// assert!(matches!(
///     &outcomes[1],
///     RecordOutcome::Rejected(r) if r.reason == RejectionReason::NegativeAmount
/// ));
/// ```
pub fn classify_expenses(expenses: &[Expense], limits: &Limits) -> EngineResult<Vec<RecordOutcome>> {
    let mut seen_dates: HashSet<&str> = HashSet::new();
    let mut outcomes = Vec::with_capacity(expenses.len());

    for expense in expenses {
        let outcome = match admit(expense, limits, &seen_dates) {
            Ok((text, date)) => {
                let residue = compute_residue(expense.amount, limits.ceiling_step)?;
                seen_dates.insert(text);
                RecordOutcome::Accepted(ValidatedRecord {
                    date,
                    amount: expense.amount,
                    ceiling: residue.ceiling,
                    remanent: residue.remanent,
                })
            }
            Err(reason) => RecordOutcome::Rejected(RejectedRecord {
                date: expense.date.clone(),
                amount: expense.amount,
                reason,
            }),
        };
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

/// Runs the admissibility checks, returning the date text and instant.
fn admit<'a>(
    expense: &'a Expense,
    limits: &Limits,
    seen_dates: &HashSet<&str>,
) -> Result<(&'a str, NaiveDateTime), RejectionReason> {
    if expense.amount < Decimal::ZERO {
        return Err(RejectionReason::NegativeAmount);
    }
    if expense.amount >= limits.max_amount {
        return Err(RejectionReason::AmountTooLarge);
    }

    let text = expense
        .date
        .as_deref()
        .filter(|d| !d.is_empty())
        .ok_or(RejectionReason::MissingOrMalformedDate)?;
    let date = parse_strict(text).ok_or(RejectionReason::MissingOrMalformedDate)?;

    if seen_dates.contains(text) {
        return Err(RejectionReason::DuplicateDate);
    }

    Ok((text, date))
}

/// Fails if `value` has fractional digits while the call is integral.
fn ensure_representation(policy: NumericPolicy, field: String, value: Decimal) -> EngineResult<()> {
    match policy {
        NumericPolicy::Integral if !value.fract().is_zero() => {
            Err(EngineError::MixedNumericRepresentation {
                field,
                value: value.normalize().to_string(),
            })
        }
        _ => Ok(()),
    }
}

/// Checks every amount and rule value of a call against its numeric policy.
///
/// # Errors
///
/// Returns [`EngineError::MixedNumericRepresentation`] naming the first
/// fractional value found under [`NumericPolicy::Integral`].
pub fn check_numeric_policy(
    policy: NumericPolicy,
    expenses: &[Expense],
    overrides: &[OverridePeriod],
    additions: &[AdditionPeriod],
) -> EngineResult<()> {
    for (i, expense) in expenses.iter().enumerate() {
        ensure_representation(policy, format!("expenses[{}].amount", i), expense.amount)?;
    }
    for (i, period) in overrides.iter().enumerate() {
        ensure_representation(policy, format!("q[{}].fixed", i), period.fixed)?;
    }
    for (i, period) in additions.iter().enumerate() {
        ensure_representation(policy, format!("p[{}].extra", i), period.extra)?;
    }
    Ok(())
}
