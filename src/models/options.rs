//! Per-call policies.
//!
//! Each call path has its own defaults; every switch can be overridden
//! through [`CallOptions`].

use serde::{Deserialize, Serialize};

/// Which of the two investment presets a projection uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentVehicle {
    /// The pension scheme: lower guaranteed rate, tax advantaged.
    Nps,
    /// The market index fund: higher rate, no tax benefit.
    Index,
}

impl std::fmt::Display for InvestmentVehicle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvestmentVehicle::Nps => write!(f, "nps"),
            InvestmentVehicle::Index => write!(f, "index"),
        }
    }
}

/// How monetary inputs of a call are represented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericPolicy {
    /// Amounts and rule values may carry fractional digits.
    #[default]
    Fractional,
    /// Amounts and rule values must be whole numbers (e.g. minor units).
    Integral,
}

/// Whether records whose resolved remanent is exactly zero take part in
/// aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroRemanentPolicy {
    /// Zero-remanent records are aggregated and reported normally.
    Keep,
    /// Zero-remanent records are treated as "no savings event" and dropped.
    Exclude,
}

/// Where the tax benefit of the tax-advantaged vehicle is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxBenefitScope {
    /// Every window uses its own sum as the eligible investment.
    #[default]
    PerWindow,
    /// One benefit from the total resolved savings of the call.
    Global,
}

/// What a window's `profit` is measured against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfitBasis {
    /// `future_value - principal`.
    #[default]
    Nominal,
    /// `inflation_adjusted - principal`.
    InflationAdjusted,
}

/// The policy switches of one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallOptions {
    /// Numeric representation of every amount and rule value.
    #[serde(default)]
    pub numeric: NumericPolicy,
    /// Zero-remanent handling.
    pub zero_remanent: ZeroRemanentPolicy,
    /// Tax benefit scope.
    #[serde(default)]
    pub tax_scope: TaxBenefitScope,
    /// Profit basis.
    #[serde(default)]
    pub profit_basis: ProfitBasis,
}

impl CallOptions {
    /// Defaults of the filter path: zero-remanent records are dropped.
    pub fn filter_defaults() -> Self {
        Self {
            numeric: NumericPolicy::default(),
            zero_remanent: ZeroRemanentPolicy::Exclude,
            tax_scope: TaxBenefitScope::default(),
            profit_basis: ProfitBasis::default(),
        }
    }

    /// Defaults of the returns path: zero-remanent records are kept.
    pub fn returns_defaults() -> Self {
        Self {
            zero_remanent: ZeroRemanentPolicy::Keep,
            ..Self::filter_defaults()
        }
    }
}
