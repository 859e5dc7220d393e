//! Time-windowed rule periods.
//!
//! Callers supply periods with textual boundaries. The engine parses them
//! leniently into [`DateRange`]s before any record is processed.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A closed interval `[start, end]` of instants, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    /// First instant inside the range.
    #[serde(with = "super::date_format")]
    pub start: NaiveDateTime,
    /// Last instant inside the range.
    #[serde(with = "super::date_format")]
    pub end: NaiveDateTime,
}

impl DateRange {
    /// Returns whether `instant` lies inside the range.
    ///
    /// A range whose `end` precedes its `start` contains nothing.
    ///
    /// # Example
    ///
    /// ```
    /// use roundup_engine::models::DateRange;
    /// use chrono::NaiveDateTime;
    ///
    /// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
    /// let october = DateRange {
    ///     start: at("2021-10-01 00:00:00"),
    ///     end: at("2021-10-31 23:59:59"),
    /// };
    /// assert!(october.contains(at("2021-10-31 23:59:59")));
    /// assert!(!october.contains(at("2021-11-01 00:00:00")));
    /// ```
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// A q-rule as supplied: replaces the remanent with `fixed` inside the period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverridePeriod {
    /// Period start text.
    pub start: String,
    /// Period end text.
    pub end: String,
    /// The value that replaces the remanent.
    pub fixed: Decimal,
}

/// A p-rule as supplied: adds `extra` to the remanent inside the period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionPeriod {
    /// Period start text.
    pub start: String,
    /// Period end text.
    pub end: String,
    /// The value added to the remanent.
    pub extra: Decimal,
}

/// A k-rule as supplied: a window used only for aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingWindow {
    /// Window start text.
    pub start: String,
    /// Window end text.
    pub end: String,
}

/// A parsed override rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverrideRule {
    /// Where the rule applies.
    pub range: DateRange,
    /// The replacement remanent.
    pub fixed: Decimal,
}

/// A parsed addition rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdditionRule {
    /// Where the rule applies.
    pub range: DateRange,
    /// The amount added.
    pub extra: Decimal,
}

/// A parsed reporting window, keeping the caller's text for echoing back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRule {
    /// Where the window applies.
    pub range: DateRange,
    /// Start text as supplied.
    pub start_text: String,
    /// End text as supplied.
    pub end_text: String,
}
