//! Request types for the savings engine API.
//!
//! Rule periods keep their short names (`q`, `p`, `k`) on the wire, and
//! every expense list also accepts the key `transactions`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{
    AdditionPeriod, CallOptions, Expense, FilterInput, NumericPolicy, OverridePeriod, ProfitBasis,
    ReportingWindow, ReturnsInput, StandaloneInput, TaxBenefitScope, ZeroRemanentPolicy,
};

/// Request body for `/transactions/parse`: a bare list or `{ "expenses": [...] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParseRequest {
    /// A bare JSON array of expenses.
    List(Vec<Expense>),
    /// An object wrapping the expenses.
    Wrapped {
        /// The expenses to enrich.
        #[serde(alias = "transactions")]
        expenses: Vec<Expense>,
    },
}

impl ParseRequest {
    /// Returns the expenses regardless of the envelope used.
    pub fn into_expenses(self) -> Vec<Expense> {
        match self {
            ParseRequest::List(expenses) | ParseRequest::Wrapped { expenses } => expenses,
        }
    }
}

/// Per-request overrides of the call path's default policies.
///
/// Omitted fields keep the call path's default.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct OptionsRequest {
    /// Numeric representation.
    #[serde(default)]
    pub numeric: Option<NumericPolicy>,
    /// Zero-remanent handling.
    #[serde(default)]
    pub zero_remanent: Option<ZeroRemanentPolicy>,
    /// Tax benefit scope.
    #[serde(default)]
    pub tax_scope: Option<TaxBenefitScope>,
    /// Profit basis.
    #[serde(default)]
    pub profit_basis: Option<ProfitBasis>,
}

impl OptionsRequest {
    /// Applies these overrides on top of `defaults`.
    pub fn resolve(self, defaults: CallOptions) -> CallOptions {
        CallOptions {
            numeric: self.numeric.unwrap_or(defaults.numeric),
            zero_remanent: self.zero_remanent.unwrap_or(defaults.zero_remanent),
            tax_scope: self.tax_scope.unwrap_or(defaults.tax_scope),
            profit_basis: self.profit_basis.unwrap_or(defaults.profit_basis),
        }
    }
}

/// Request body for `/transactions/validator`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorRequest {
    /// The expenses to validate.
    #[serde(alias = "transactions")]
    pub expenses: Vec<Expense>,
    /// Annual income; accepted for compatibility, not used by validation.
    #[serde(default)]
    pub wage: Option<Decimal>,
    /// Policy overrides; only `numeric` applies here.
    #[serde(default)]
    pub options: Option<OptionsRequest>,
}

/// Request body for `/transactions/filter`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRequest {
    /// The expenses to filter.
    #[serde(alias = "transactions")]
    pub expenses: Vec<Expense>,
    /// Override periods.
    #[serde(default)]
    pub q: Vec<OverridePeriod>,
    /// Addition periods.
    #[serde(default)]
    pub p: Vec<AdditionPeriod>,
    /// Reporting windows.
    #[serde(default)]
    pub k: Vec<ReportingWindow>,
    /// Policy overrides.
    #[serde(default)]
    pub options: Option<OptionsRequest>,
}

impl From<FilterRequest> for FilterInput {
    fn from(req: FilterRequest) -> Self {
        FilterInput {
            expenses: req.expenses,
            overrides: req.q,
            additions: req.p,
            windows: req.k,
        }
    }
}

/// Request body for `/returns/nps` and `/returns/index`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnsRequest {
    /// The expenses to project.
    #[serde(alias = "transactions")]
    pub expenses: Vec<Expense>,
    /// Override periods.
    #[serde(default)]
    pub q: Vec<OverridePeriod>,
    /// Addition periods.
    #[serde(default)]
    pub p: Vec<AdditionPeriod>,
    /// Reporting windows.
    #[serde(default)]
    pub k: Vec<ReportingWindow>,
    /// Age in whole years.
    pub age: u32,
    /// Annual income.
    pub wage: Decimal,
    /// Annual inflation, as a fraction or a percentage.
    pub inflation: Decimal,
    /// Policy overrides.
    #[serde(default)]
    pub options: Option<OptionsRequest>,
}

impl From<ReturnsRequest> for ReturnsInput {
    fn from(req: ReturnsRequest) -> Self {
        ReturnsInput {
            periods: FilterInput {
                expenses: req.expenses,
                overrides: req.q,
                additions: req.p,
                windows: req.k,
            },
            age: req.age,
            wage: req.wage,
            inflation: req.inflation,
        }
    }
}

/// Request body for `/projections/nps` and `/projections/index`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionRequest {
    /// The principal.
    pub invested: Decimal,
    /// Age in whole years.
    pub age: u32,
    /// Annual income.
    #[serde(default)]
    pub wage: Option<Decimal>,
    /// Annual inflation, as a fraction or a percentage.
    pub inflation: Decimal,
}

impl From<ProjectionRequest> for StandaloneInput {
    fn from(req: ProjectionRequest) -> Self {
        StandaloneInput {
            invested: req.invested,
            age: req.age,
            wage: req.wage,
            inflation: req.inflation,
        }
    }
}
