//! Core data models for the savings engine.
//!
//! This module contains all the domain models used throughout the engine.
//! Every value here lives for a single call.

pub mod date_format;
mod expense;
mod input;
mod options;
mod period;
mod record;
mod results;

pub use expense::{Expense, Transaction};
pub use input::{FilterInput, ReturnsInput, StandaloneInput};
pub use options::{
    CallOptions, InvestmentVehicle, NumericPolicy, ProfitBasis, TaxBenefitScope,
    ZeroRemanentPolicy,
};
pub use period::{
    AdditionPeriod, AdditionRule, DateRange, OverridePeriod, OverrideRule, ReportingWindow,
    WindowRule,
};
pub use record::{RecordOutcome, RejectedRecord, RejectionReason, ValidatedRecord, ValidationOutcome};
pub use results::{
    AuditStep, AuditTrace, FilterOutcome, FilteredRecord, ReturnsOutcome, StandaloneProjection,
    WindowResult, WindowSum,
};
