//! Raw expense input and its unvalidated enrichment.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A raw expense as supplied by the caller.
///
/// The date is kept as the caller's text: duplicate detection keys on the
/// exact string, and a missing or malformed date is a per-record rejection
/// rather than a deserialization failure.
///
/// # Example
///
/// ```
/// use roundup_engine::models::Expense;
/// use rust_decimal::Decimal;
///
/// let expense = Expense::new("2021-10-01 20:15:00", Decimal::from(1519));
/// assert_eq!(expense.date.as_deref(), Some("2021-10-01 20:15:00"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// The expense timestamp in `YYYY-MM-DD hh:mm:ss` form.
    #[serde(default)]
    pub date: Option<String>,
    /// The amount spent.
    pub amount: Decimal,
}

impl Expense {
    /// Creates an expense with the given date text and amount.
    pub fn new(date: impl Into<String>, amount: Decimal) -> Self {
        Self {
            date: Some(date.into()),
            amount,
        }
    }
}

/// An expense enriched with its ceiling and remanent, without validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// The date text exactly as supplied.
    pub date: Option<String>,
    /// The amount spent.
    pub amount: Decimal,
    /// The amount rounded up to the ceiling step.
    pub ceiling: Decimal,
    /// `ceiling - amount`.
    pub remanent: Decimal,
}
