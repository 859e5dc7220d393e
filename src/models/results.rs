//! Result models for the savings engine.
//!
//! This module contains the outputs of the filter, returns and projection
//! call paths, plus the audit trace recording every rule decision.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{RejectedRecord, ValidatedRecord};

/// A single step in the audit trace recording a rule decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
///
/// # Example
///
/// ```
/// use roundup_engine::models::AuditStep;
///
/// let step = AuditStep {
///     step_number: 1,
///     rule_id: "override_resolution".to_string(),
///     rule_name: "Override Resolution".to_string(),
///     input: serde_json::json!({"remanent": "81"}),
///     output: serde_json::json!({"remanent": "50"}),
///     reasoning: "q[0] replaces remanent 81 with 50".to_string(),
/// };
/// assert_eq!(step.rule_id, "override_resolution");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// The complete audit trace for one call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of rule decisions.
    pub steps: Vec<AuditStep>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

/// An accepted record with its resolved remanent and window membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteredRecord {
    /// The record; `remanent` holds the rule-adjusted value.
    #[serde(flatten)]
    pub record: ValidatedRecord,
    /// Whether the record falls inside at least one reporting window.
    pub in_window: bool,
}

/// The resolved-remanent total of one reporting window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSum {
    /// Window start text as supplied.
    pub start: String,
    /// Window end text as supplied.
    pub end: String,
    /// Sum of resolved remanents inside the window.
    pub sum: Decimal,
}

/// The projected outcome of one reporting window.
///
/// All monetary fields are rounded to two decimal places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowResult {
    /// Window start text as supplied.
    pub start: String,
    /// Window end text as supplied.
    pub end: String,
    /// Sum of resolved remanents inside the window.
    pub sum: Decimal,
    /// Projected profit on `sum`.
    pub profit: Decimal,
    /// Tax benefit of investing `sum` (zero for vehicles without one).
    pub tax_benefit: Decimal,
}

/// Output of the filter call path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOutcome {
    /// Accepted records in input order.
    pub valid: Vec<FilteredRecord>,
    /// Rejected records in input order.
    pub invalid: Vec<RejectedRecord>,
    /// One entry per reporting window, in input order.
    pub windows: Vec<WindowSum>,
    /// Rule decisions taken while filtering.
    pub audit_trace: AuditTrace,
}

/// Output of the returns call path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnsOutcome {
    /// Sum of the accepted records' amounts.
    pub total_transaction_amount: Decimal,
    /// Sum of the accepted records' ceilings.
    pub total_ceiling: Decimal,
    /// One entry per reporting window, in input order.
    pub windows: Vec<WindowResult>,
    /// The single benefit computed under the global tax scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_tax_benefit: Option<Decimal>,
    /// Rule decisions taken while computing returns.
    pub audit_trace: AuditTrace,
}

/// Output of a standalone projection of a directly invested amount.
///
/// All monetary fields are rounded to two decimal places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandaloneProjection {
    /// The invested principal.
    pub invested: Decimal,
    /// Nominal value at retirement.
    pub returns: Decimal,
    /// `returns - invested`.
    pub profit: Decimal,
    /// `returns` expressed in today's money.
    pub inflation_adjusted: Decimal,
    /// Tax saved by the investment (zero for vehicles without one).
    pub tax_benefit: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn test_filtered_record_flattens_record_fields() {
        let filtered = FilteredRecord {
            record: ValidatedRecord {
                date: NaiveDateTime::parse_from_str("2023-10-12 20:15:30", "%Y-%m-%d %H:%M:%S")
                    .unwrap(),
                amount: Decimal::from(250),
                ceiling: Decimal::from(300),
                remanent: Decimal::from(80),
            },
            in_window: true,
        };

        let json = serde_json::to_value(&filtered).unwrap();
        assert_eq!(json["date"], "2023-10-12 20:15:30");
        assert_eq!(json["remanent"], "80");
        assert_eq!(json["in_window"], true);
    }

    #[test]
    fn test_returns_outcome_omits_absent_global_benefit() {
        let outcome = ReturnsOutcome {
            total_transaction_amount: Decimal::ZERO,
            total_ceiling: Decimal::ZERO,
            windows: vec![],
            global_tax_benefit: None,
            audit_trace: AuditTrace::default(),
        };

        let json = serde_json::to_string(&outcome).unwrap();
        assert!(!json.contains("global_tax_benefit"));
    }
}
