//! Call paths chaining the rule components.
//!
//! Every path is a pure function of its inputs and an [`EngineConfig`].
//! Fatal problems (malformed rule periods, mixed numeric representation,
//! a negative horizon) are detected before any record is processed, so a
//! call either produces a complete result or none at all.

use std::time::Instant;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::models::{
    AdditionRule, AuditStep, AuditTrace, CallOptions, Expense, FilterInput, FilterOutcome,
    FilteredRecord, InvestmentVehicle, NumericPolicy, OverrideRule, RecordOutcome,
    RejectedRecord, ReturnsInput, ReturnsOutcome, StandaloneInput, StandaloneProjection,
    TaxBenefitScope, Transaction, ValidatedRecord, ValidationOutcome, WindowResult, WindowRule,
    WindowSum, ZeroRemanentPolicy,
};

use super::date_parser::parse_period;
use super::projection::{checked_sum, horizon_years, project, round_money};
use super::residue::compute_residue;
use super::rule_resolver::{exclude_zero_remanent, resolve_remanent};
use super::tax::calculate_tax_benefit;
use super::validator::{check_numeric_policy, classify_expenses};
use super::window_aggregator::{aggregate_windows, window_membership};

/// Enriches every expense with its ceiling and remanent, without validation.
///
/// # Errors
///
/// Returns [`crate::error::EngineError::CalculationError`] if an amount
/// cannot be rounded up to the ceiling step.
///
/// # Example
///
/// ```
/// use roundup_engine::calculation::parse_expenses;
/// use roundup_engine::config::EngineConfig;
/// use roundup_engine::models::Expense;
/// use rust_decimal::Decimal;
///
/// let transactions = parse_expenses(
///     &[Expense::new("2023-10-12 20:15:30", Decimal::from(250))],
///     &EngineConfig::default(),
/// )
/// .unwrap();
/// assert_eq!(transactions[0].ceiling, Decimal::from(300));
/// assert_eq!(transactions[0].remanent, Decimal::from(50));
/// ```
pub fn parse_expenses(
    expenses: &[Expense],
    config: &EngineConfig,
) -> EngineResult<Vec<Transaction>> {
    let step = config.limits().ceiling_step;

    expenses
        .iter()
        .map(|expense| {
            let residue = compute_residue(expense.amount, step)?;
            Ok(Transaction {
                date: expense.date.clone(),
                amount: expense.amount,
                ceiling: residue.ceiling,
                remanent: residue.remanent,
            })
        })
        .collect()
}

/// Splits expenses into accepted and rejected records.
///
/// # Errors
///
/// Returns [`crate::error::EngineError::MixedNumericRepresentation`] if an
/// amount is fractional under [`NumericPolicy::Integral`], or a calculation
/// error if an accepted amount cannot be rounded up.
pub fn validate_expenses(
    expenses: &[Expense],
    policy: NumericPolicy,
    config: &EngineConfig,
) -> EngineResult<ValidationOutcome> {
    check_numeric_policy(policy, expenses, &[], &[])?;

    let outcome: ValidationOutcome = classify_expenses(expenses, config.limits())?
        .into_iter()
        .collect();

    debug!(
        accepted = outcome.accepted.len(),
        rejected = outcome.rejected.len(),
        "Validated expenses"
    );
    Ok(outcome)
}

/// Rule periods of one call, parsed leniently.
struct ParsedRules {
    overrides: Vec<OverrideRule>,
    additions: Vec<AdditionRule>,
    windows: Vec<WindowRule>,
}

fn parse_rules(input: &FilterInput) -> EngineResult<ParsedRules> {
    let overrides = input
        .overrides
        .iter()
        .enumerate()
        .map(|(i, q)| {
            Ok(OverrideRule {
                range: parse_period(&format!("q[{}]", i), &q.start, &q.end)?,
                fixed: q.fixed,
            })
        })
        .collect::<EngineResult<Vec<_>>>()?;

    let additions = input
        .additions
        .iter()
        .enumerate()
        .map(|(i, p)| {
            Ok(AdditionRule {
                range: parse_period(&format!("p[{}]", i), &p.start, &p.end)?,
                extra: p.extra,
            })
        })
        .collect::<EngineResult<Vec<_>>>()?;

    let windows = input
        .windows
        .iter()
        .enumerate()
        .map(|(i, k)| {
            Ok(WindowRule {
                range: parse_period(&format!("k[{}]", i), &k.start, &k.end)?,
                start_text: k.start.clone(),
                end_text: k.end.clone(),
            })
        })
        .collect::<EngineResult<Vec<_>>>()?;

    Ok(ParsedRules {
        overrides,
        additions,
        windows,
    })
}

/// Checks the numeric policy and parses every rule period.
fn prepare(input: &FilterInput, options: &CallOptions) -> EngineResult<ParsedRules> {
    let prepared = check_numeric_policy(
        options.numeric,
        &input.expenses,
        &input.overrides,
        &input.additions,
    )
    .and_then(|()| parse_rules(input));

    if let Err(err) = &prepared {
        warn!(error = %err, "Rejecting call before processing records");
    }
    prepared
}

/// Accepted records after rule resolution and zero-remanent handling.
struct ResolvedBatch {
    /// Every accepted record, with its initial remanent.
    accepted: Vec<ValidatedRecord>,
    /// Accepted records kept for aggregation, with resolved remanents.
    kept: Vec<ValidatedRecord>,
    rejected: Vec<RejectedRecord>,
    excluded: usize,
}

fn resolve_batch(
    expenses: &[Expense],
    rules: &ParsedRules,
    zero_policy: ZeroRemanentPolicy,
    config: &EngineConfig,
    steps: &mut Vec<AuditStep>,
    next_step: &mut u32,
) -> EngineResult<ResolvedBatch> {
    let mut batch = ResolvedBatch {
        accepted: Vec::new(),
        kept: Vec::new(),
        rejected: Vec::new(),
        excluded: 0,
    };

    for outcome in classify_expenses(expenses, config.limits())? {
        let record = match outcome {
            RecordOutcome::Accepted(record) => record,
            RecordOutcome::Rejected(rejected) => {
                batch.rejected.push(rejected);
                continue;
            }
        };

        let resolved = resolve_remanent(
            record.date,
            record.remanent,
            &rules.overrides,
            &rules.additions,
            next_step,
        )?;
        steps.extend(resolved.audit_steps);

        if let Some(step) =
            exclude_zero_remanent(record.date, resolved.remanent, zero_policy, *next_step)
        {
            steps.push(step);
            *next_step += 1;
            batch.excluded += 1;
            batch.accepted.push(record);
            continue;
        }

        batch.kept.push(ValidatedRecord {
            remanent: resolved.remanent,
            ..record.clone()
        });
        batch.accepted.push(record);
    }

    debug!(
        accepted = batch.accepted.len(),
        rejected = batch.rejected.len(),
        excluded = batch.excluded,
        "Resolved expense batch"
    );
    Ok(batch)
}

/// Validates, resolves and aggregates expenses into reporting windows.
///
/// `valid` lists the kept records with their resolved remanents; under
/// [`ZeroRemanentPolicy::Exclude`] records resolving to zero are dropped
/// from both `valid` and the window sums.
///
/// # Errors
///
/// Fails without processing any record if a rule period cannot be parsed
/// or the numeric policy is violated. Fails with
/// [`crate::error::EngineError::CalculationError`] if resolving or summing
/// remanents overflows.
///
/// # Example
///
/// ```
/// use roundup_engine::calculation::filter_expenses;
/// use roundup_engine::config::EngineConfig;
/// use roundup_engine::models::{CallOptions, Expense, FilterInput, ReportingWindow};
/// use rust_decimal::Decimal;
///
/// let input = FilterInput {
///     expenses: vec![Expense::new("2021-10-01 20:15:00", Decimal::from(1519))],
///     windows: vec![ReportingWindow {
///         start: "2021-10-01 00:00:00".to_string(),
///         end: "2021-10-31 23:59:59".to_string(),
///     }],
///     ..Default::default()
/// };
///
/// let outcome =
///     filter_expenses(&input, &CallOptions::filter_defaults(), &EngineConfig::default()).unwrap();
/// assert_eq!(outcome.windows[0].sum, Decimal::from(81));
/// assert!(outcome.valid[0].in_window);
/// ```
pub fn filter_expenses(
    input: &FilterInput,
    options: &CallOptions,
    config: &EngineConfig,
) -> EngineResult<FilterOutcome> {
    let start_time = Instant::now();
    let rules = prepare(input, options)?;

    let mut steps = Vec::new();
    let mut next_step: u32 = 1;
    let batch = resolve_batch(
        &input.expenses,
        &rules,
        options.zero_remanent,
        config,
        &mut steps,
        &mut next_step,
    )?;

    let aggregation = aggregate_windows(&batch.kept, &rules.windows, &mut next_step)?;
    steps.extend(aggregation.audit_steps);

    let windows = aggregation
        .windows
        .into_iter()
        .map(|window| WindowSum {
            sum: round_money(window.sum),
            ..window
        })
        .collect();

    let valid = batch
        .kept
        .into_iter()
        .map(|record| FilteredRecord {
            in_window: window_membership(record.date, &rules.windows),
            record,
        })
        .collect();

    Ok(FilterOutcome {
        valid,
        invalid: batch.rejected,
        windows,
        audit_trace: AuditTrace {
            steps,
            duration_us: start_time.elapsed().as_micros() as u64,
        },
    })
}

/// Validates, resolves and aggregates expenses, then projects every window.
///
/// Totals cover every accepted record regardless of windows or
/// zero-remanent handling.
///
/// # Errors
///
/// Fails without processing any record on a negative horizon, a malformed
/// rule period, or a numeric policy violation. Fails with
/// [`crate::error::EngineError::CalculationError`] if a sum, projection or
/// tax benefit overflows.
pub fn calculate_returns(
    input: &ReturnsInput,
    vehicle: InvestmentVehicle,
    options: &CallOptions,
    config: &EngineConfig,
) -> EngineResult<ReturnsOutcome> {
    let start_time = Instant::now();
    let years = horizon_years(input.age, config.retirement_age()).inspect_err(|err| {
        warn!(error = %err, "Rejecting call before processing records");
    })?;
    let rules = prepare(&input.periods, options)?;

    let mut steps = Vec::new();
    let mut next_step: u32 = 1;
    let batch = resolve_batch(
        &input.periods.expenses,
        &rules,
        options.zero_remanent,
        config,
        &mut steps,
        &mut next_step,
    )?;

    let total_transaction_amount = checked_sum(
        batch.accepted.iter().map(|r| r.amount),
        "total transaction amount",
    )?;
    let total_ceiling = checked_sum(batch.accepted.iter().map(|r| r.ceiling), "total ceiling")?;

    let aggregation = aggregate_windows(&batch.kept, &rules.windows, &mut next_step)?;
    steps.extend(aggregation.audit_steps);

    let preset = config.vehicle(vehicle);
    let per_window_tax = preset.tax_advantaged && options.tax_scope == TaxBenefitScope::PerWindow;

    let mut windows = Vec::with_capacity(aggregation.windows.len());
    for (i, window) in aggregation.windows.into_iter().enumerate() {
        let projection = project(window.sum, preset.annual_rate, years, input.inflation)?;
        let profit = projection.profit(options.profit_basis)?;

        steps.push(AuditStep {
            step_number: next_step,
            rule_id: "window_projection".to_string(),
            rule_name: "Window Projection".to_string(),
            input: serde_json::json!({
                "window": format!("k[{}]", i),
                "sum": window.sum.normalize().to_string(),
                "vehicle": vehicle.to_string(),
                "annual_rate": preset.annual_rate.normalize().to_string(),
                "years": years,
                "inflation": input.inflation.normalize().to_string()
            }),
            output: serde_json::json!({
                "future_value": round_money(projection.future_value).to_string(),
                "inflation_adjusted": round_money(projection.inflation_adjusted).to_string(),
                "profit": round_money(profit).to_string()
            }),
            reasoning: format!(
                "{} compounded at {} for {} years",
                window.sum.normalize(),
                preset.annual_rate.normalize(),
                years
            ),
        });
        next_step += 1;

        let tax_benefit = if per_window_tax {
            let benefit = calculate_tax_benefit(window.sum, input.wage, config.tax(), next_step)?;
            steps.push(benefit.audit_step);
            next_step += 1;
            round_money(benefit.benefit)
        } else {
            Decimal::ZERO
        };

        windows.push(WindowResult {
            start: window.start,
            end: window.end,
            sum: round_money(window.sum),
            profit: round_money(profit),
            tax_benefit,
        });
    }

    let global_tax_benefit = match options.tax_scope {
        TaxBenefitScope::PerWindow => None,
        TaxBenefitScope::Global if preset.tax_advantaged => {
            let invested = checked_sum(batch.kept.iter().map(|r| r.remanent), "total savings")?;
            let benefit = calculate_tax_benefit(invested, input.wage, config.tax(), next_step)?;
            steps.push(benefit.audit_step);
            Some(round_money(benefit.benefit))
        }
        TaxBenefitScope::Global => Some(Decimal::ZERO),
    };

    Ok(ReturnsOutcome {
        total_transaction_amount: round_money(total_transaction_amount),
        total_ceiling: round_money(total_ceiling),
        windows,
        global_tax_benefit,
        audit_trace: AuditTrace {
            steps,
            duration_us: start_time.elapsed().as_micros() as u64,
        },
    })
}

/// Projects a directly invested amount to retirement.
///
/// The tax benefit is zero for vehicles without one, or when no wage is
/// given.
///
/// # Errors
///
/// Returns [`crate::error::EngineError::InvalidHorizon`] if `age` is past
/// the retirement age, or a calculation error if the projection fails.
///
/// # Example
///
/// ```
/// use roundup_engine::calculation::project_investment;
/// use roundup_engine::config::EngineConfig;
/// use roundup_engine::models::{InvestmentVehicle, StandaloneInput};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let input = StandaloneInput {
///     invested: Decimal::from(145),
///     age: 29,
///     wage: None,
///     inflation: Decimal::from_str("5.5").unwrap(),
/// };
///
/// let projection =
///     project_investment(&input, InvestmentVehicle::Nps, &EngineConfig::default()).unwrap();
/// assert_eq!(projection.returns, Decimal::from_str("1219.27").unwrap());
/// assert_eq!(projection.tax_benefit, Decimal::ZERO);
/// ```
pub fn project_investment(
    input: &StandaloneInput,
    vehicle: InvestmentVehicle,
    config: &EngineConfig,
) -> EngineResult<StandaloneProjection> {
    let years = horizon_years(input.age, config.retirement_age()).inspect_err(|err| {
        warn!(error = %err, "Rejecting standalone projection");
    })?;

    let preset = config.vehicle(vehicle);
    let projection = project(input.invested, preset.annual_rate, years, input.inflation)?;

    let tax_benefit = match input.wage {
        Some(wage) if preset.tax_advantaged => {
            round_money(calculate_tax_benefit(input.invested, wage, config.tax(), 1)?.benefit)
        }
        _ => Decimal::ZERO,
    };

    debug!(%vehicle, years, "Projected standalone investment");

    Ok(StandaloneProjection {
        invested: round_money(input.invested),
        returns: round_money(projection.future_value),
        profit: round_money(projection.nominal_profit()?),
        inflation_adjusted: round_money(projection.inflation_adjusted),
        tax_benefit,
    })
}
