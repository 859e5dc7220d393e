//! Configuration types for the savings engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files, together with the
//! built-in defaults used when no configuration directory is supplied.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::InvestmentVehicle;

/// Admissibility limits and the rounding step for expenses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Limits {
    /// Amounts greater than or equal to this value are rejected.
    pub max_amount: Decimal,
    /// Expenses are rounded up to the next multiple of this step.
    pub ceiling_step: Decimal,
}

/// The preset for one investment vehicle.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VehicleConfig {
    /// Annual growth rate, as a decimal (`0.0711`) or a percentage (`7.11`).
    pub annual_rate: Decimal,
    /// Whether contributions qualify for the income tax deduction.
    #[serde(default)]
    pub tax_advantaged: bool,
}

/// The investment vehicles known to the engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Vehicles {
    /// The lower-rate, tax-advantaged pension scheme.
    pub nps: VehicleConfig,
    /// The higher-rate market index fund.
    pub index: VehicleConfig,
}

/// Contents of `engine.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineSettings {
    /// Expense limits.
    pub limits: Limits,
    /// Age at which the projection horizon ends.
    pub retirement_age: u32,
    /// Investment vehicle presets.
    pub vehicles: Vehicles,
}

/// One band of the progressive tax schedule.
///
/// The band starts at `lower` and runs up to the next band's `lower`; the
/// last band is unbounded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaxBracket {
    /// Income at which this band starts.
    pub lower: Decimal,
    /// Marginal rate applied to income inside this band.
    pub rate: Decimal,
}

/// Limits on the deduction an investment can claim against income.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeductionRules {
    /// Fraction of the wage that can be deducted (`0.10`).
    pub wage_fraction: Decimal,
    /// Absolute cap on the deduction.
    pub cap: Decimal,
}

/// Contents of `tax.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaxSchedule {
    /// Bands sorted by ascending `lower`.
    pub brackets: Vec<TaxBracket>,
    /// Deduction limits.
    pub deduction: DeductionRules,
}

impl Default for TaxSchedule {
    fn default() -> Self {
        let bracket = |lower: i64, rate_pct: i64| TaxBracket {
            lower: Decimal::from(lower),
            rate: Decimal::new(rate_pct, 2),
        };
        Self {
            brackets: vec![
                bracket(0, 0),
                bracket(700_000, 10),
                bracket(1_000_000, 15),
                bracket(1_200_000, 20),
                bracket(1_500_000, 30),
            ],
            deduction: DeductionRules {
                wage_fraction: Decimal::new(10, 2),
                cap: Decimal::from(200_000),
            },
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            limits: Limits {
                max_amount: Decimal::from(500_000),
                ceiling_step: Decimal::from(100),
            },
            retirement_age: 60,
            vehicles: Vehicles {
                nps: VehicleConfig {
                    annual_rate: Decimal::new(711, 4),
                    tax_advantaged: true,
                },
                index: VehicleConfig {
                    annual_rate: Decimal::new(1449, 4),
                    tax_advantaged: false,
                },
            },
        }
    }
}

/// The complete engine configuration.
///
/// Aggregates `engine.yaml` and `tax.yaml`. The `Default` implementation
/// carries the same values as the shipped `config/default` directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    settings: EngineSettings,
    tax: TaxSchedule,
}

impl EngineConfig {
    /// Creates a new EngineConfig from its component parts.
    pub fn new(settings: EngineSettings, tax: TaxSchedule) -> Self {
        Self { settings, tax }
    }

    /// Returns the expense limits.
    pub fn limits(&self) -> &Limits {
        &self.settings.limits
    }

    /// Returns the retirement age.
    pub fn retirement_age(&self) -> u32 {
        self.settings.retirement_age
    }

    /// Returns the preset for the given vehicle.
    pub fn vehicle(&self, vehicle: InvestmentVehicle) -> &VehicleConfig {
        match vehicle {
            InvestmentVehicle::Nps => &self.settings.vehicles.nps,
            InvestmentVehicle::Index => &self.settings.vehicles.index,
        }
    }

    /// Returns the progressive tax schedule.
    pub fn tax(&self) -> &TaxSchedule {
        &self.tax
    }
}
