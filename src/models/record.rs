//! Validated and rejected expense records.
//!
//! A record is either accepted or rejected; the two are variants of
//! [`RecordOutcome`], never a parent/child pair.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An expense that passed validation, with its computed residue.
///
/// Invariant: `ceiling` is `amount` rounded up to the next multiple of the
/// ceiling step and `remanent = ceiling - amount >= 0`. Rule resolution
/// may later replace `remanent`; the filter path reports the resolved value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedRecord {
    /// The parsed expense timestamp.
    #[serde(with = "super::date_format")]
    pub date: NaiveDateTime,
    /// The amount spent.
    pub amount: Decimal,
    /// The amount rounded up to the ceiling step.
    pub ceiling: Decimal,
    /// The savings residue.
    pub remanent: Decimal,
}

/// Why an expense was rejected.
///
/// Exactly one reason is attached to a rejected record; checks run in the
/// declaration order of the variants and the first failing check wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// The amount is below zero.
    NegativeAmount,
    /// The amount is at or above the configured maximum.
    AmountTooLarge,
    /// The date is absent, empty, or not a valid `YYYY-MM-DD hh:mm:ss` instant.
    MissingOrMalformedDate,
    /// The exact date text was already accepted earlier in the same call.
    DuplicateDate,
}

impl RejectionReason {
    /// Returns the human-readable explanation for this reason.
    ///
    /// `max_amount` is the configured upper limit, quoted by
    /// [`RejectionReason::AmountTooLarge`].
    pub fn message(&self, max_amount: Decimal) -> String {
        match self {
            RejectionReason::NegativeAmount => "Negative amounts are not allowed".to_string(),
            RejectionReason::AmountTooLarge => {
                format!("Amount must be less than {}", max_amount.normalize())
            }
            RejectionReason::MissingOrMalformedDate => "Invalid or missing date".to_string(),
            RejectionReason::DuplicateDate => "Duplicate transaction date".to_string(),
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectionReason::NegativeAmount => write!(f, "negative_amount"),
            RejectionReason::AmountTooLarge => write!(f, "amount_too_large"),
            RejectionReason::MissingOrMalformedDate => write!(f, "missing_or_malformed_date"),
            RejectionReason::DuplicateDate => write!(f, "duplicate_date"),
        }
    }
}

/// An expense that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRecord {
    /// The date text exactly as supplied.
    pub date: Option<String>,
    /// The amount as supplied.
    pub amount: Decimal,
    /// The first failing check.
    pub reason: RejectionReason,
}

/// The classification of a single expense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The expense passed every check.
    Accepted(ValidatedRecord),
    /// The expense failed a check.
    Rejected(RejectedRecord),
}

/// Accepted and rejected records of one call, each in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// Records that passed validation.
    pub accepted: Vec<ValidatedRecord>,
    /// Records that failed validation.
    pub rejected: Vec<RejectedRecord>,
}

impl FromIterator<RecordOutcome> for ValidationOutcome {
    fn from_iter<I: IntoIterator<Item = RecordOutcome>>(iter: I) -> Self {
        let mut outcome = ValidationOutcome::default();
        for record in iter {
            match record {
                RecordOutcome::Accepted(r) => outcome.accepted.push(r),
                RecordOutcome::Rejected(r) => outcome.rejected.push(r),
            }
        }
        outcome
    }
}
