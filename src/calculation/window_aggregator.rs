//! Reporting window aggregation.
//!
//! Windows are evaluated independently: a record counts towards every
//! window that contains it, so overlapping windows both receive its full
//! remanent.

use chrono::NaiveDateTime;

use crate::error::EngineResult;
use crate::models::{AuditStep, ValidatedRecord, WindowRule, WindowSum};

use super::projection::checked_sum;

/// Per-window sums and the audit steps recording them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowAggregation {
    /// One sum per window, in window order.
    pub windows: Vec<WindowSum>,
    /// One step per window, in window order.
    pub audit_steps: Vec<AuditStep>,
}

/// Returns whether `instant` falls inside at least one window.
pub fn window_membership(instant: NaiveDateTime, windows: &[WindowRule]) -> bool {
    windows.iter().any(|window| window.range.contains(instant))
}

/// Sums the remanent of every record inside each window.
///
/// `records` carry their resolved remanents. Step numbers are taken from
/// `next_step`, which is advanced once per window.
///
/// # Errors
///
/// Returns [`crate::error::EngineError::CalculationError`] if a window sum
/// overflows.
///
/// # Example
///
/// ```
/// use roundup_engine::calculation::{aggregate_windows, parse_period, parse_strict};
/// use roundup_engine::models::{ValidatedRecord, WindowRule};
/// use rust_decimal::Decimal;
///
/// let record = ValidatedRecord {
///     date: parse_strict("2021-10-01 20:15:00").unwrap(),
///     amount: Decimal::from(1519),
///     ceiling: Decimal::from(1600),
///     remanent: Decimal::from(81),
/// };
/// let window = WindowRule {
///     range: parse_period("k[0]", "2021-10-01 00:00:00", "2021-10-31 23:59:59").unwrap(),
///     start_text: "2021-10-01 00:00:00".to_string(),
///     end_text: "2021-10-31 23:59:59".to_string(),
/// };
///
/// let mut next_step = 1;
/// let result = aggregate_windows(&[record], &[window], &mut next_step).unwrap();
/// assert_eq!(result.windows[0].sum, Decimal::from(81));
/// ```
pub fn aggregate_windows(
    records: &[ValidatedRecord],
    windows: &[WindowRule],
    next_step: &mut u32,
) -> EngineResult<WindowAggregation> {
    let mut sums = Vec::with_capacity(windows.len());
    let mut audit_steps = Vec::with_capacity(windows.len());

    for (i, window) in windows.iter().enumerate() {
        let members: Vec<&ValidatedRecord> = records
            .iter()
            .filter(|record| window.range.contains(record.date))
            .collect();
        let sum = checked_sum(
            members.iter().map(|record| record.remanent),
            &format!("k[{}] sum", i),
        )?;

        audit_steps.push(AuditStep {
            step_number: *next_step,
            rule_id: "window_aggregation".to_string(),
            rule_name: "Window Aggregation".to_string(),
            input: serde_json::json!({
                "window": format!("k[{}]", i),
                "start": window.start_text,
                "end": window.end_text
            }),
            output: serde_json::json!({
                "records": members.len(),
                "sum": sum.normalize().to_string()
            }),
            reasoning: format!(
                "{} record(s) inside [{}, {}] sum to {}",
                members.len(),
                window.start_text,
                window.end_text,
                sum.normalize()
            ),
        });
        *next_step += 1;

        sums.push(WindowSum {
            start: window.start_text.clone(),
            end: window.end_text.clone(),
            sum,
        });
    }

    Ok(WindowAggregation {
        windows: sums,
        audit_steps,
    })
}
