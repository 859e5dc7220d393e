//! Calculation logic for the round-up savings engine.
//!
//! One module per rule component, leaf-first: date parsing, expense
//! validation, ceiling/remanent computation, override and addition
//! resolution, window aggregation, progressive tax, and compound growth
//! projection. The `pipeline` module chains them into the parse, validate,
//! filter, returns and standalone projection call paths.

mod date_parser;
mod pipeline;
mod projection;
mod residue;
mod rule_resolver;
mod tax;
mod validator;
mod window_aggregator;

pub use date_parser::{parse_lenient, parse_period, parse_strict};
pub use pipeline::{
    calculate_returns, filter_expenses, parse_expenses, project_investment, validate_expenses,
};
pub use projection::{Projection, horizon_years, normalize_rate, project, round_money};
pub use residue::{Residue, ceiling, compute_residue};
pub use rule_resolver::{
    AdditionResolution, OverrideResolution, ResolvedRemanent, exclude_zero_remanent,
    resolve_additions, resolve_override, resolve_remanent, select_override,
};
pub use tax::{TaxBenefitResult, calculate_tax, calculate_tax_benefit, eligible_deduction};
pub use validator::{check_numeric_policy, classify_expenses};
pub use window_aggregator::{WindowAggregation, aggregate_windows, window_membership};
