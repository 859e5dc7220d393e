//! Progressive income tax and the investment tax benefit.
//!
//! The default schedule has five bands:
//!
//! | Income band             | Marginal rate |
//! |-------------------------|---------------|
//! | 0 – 700,000             | 0%            |
//! | 700,000 – 1,000,000     | 10%           |
//! | 1,000,000 – 1,200,000   | 15%           |
//! | 1,200,000 – 1,500,000   | 20%           |
//! | above 1,500,000         | 30%           |
//!
//! The benefit of an investment is the tax saved by deducting it from the
//! wage: `tax(wage) - tax(wage - eligible_deduction)`, where the deduction
//! is `min(invested, wage * 10%, 200,000)`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{DeductionRules, TaxSchedule};
use crate::error::{EngineError, EngineResult};
use crate::models::AuditStep;

/// Computes the tax on `income` under `schedule`.
///
/// Each band taxes only the part of the income that falls inside it.
/// Income at or below the first taxed band's lower bound pays nothing.
///
/// # Examples
///
/// ```
/// use roundup_engine::calculation::calculate_tax;
/// use roundup_engine::config::TaxSchedule;
/// use rust_decimal::Decimal;
///
/// let schedule = TaxSchedule::default();
/// assert_eq!(calculate_tax(Decimal::from(700_000), &schedule), Decimal::ZERO);
/// assert_eq!(calculate_tax(Decimal::from(800_000), &schedule), Decimal::from(10_000));
/// assert_eq!(calculate_tax(Decimal::from(2_000_000), &schedule), Decimal::from(270_000));
/// ```
pub fn calculate_tax(income: Decimal, schedule: &TaxSchedule) -> Decimal {
    let brackets = &schedule.brackets;

    brackets
        .iter()
        .enumerate()
        .filter(|(_, bracket)| income > bracket.lower)
        .map(|(i, bracket)| {
            let top = match brackets.get(i + 1) {
                Some(next) => income.min(next.lower),
                None => income,
            };
            (top - bracket.lower) * bracket.rate
        })
        .sum()
}

/// Returns the part of `invested` that can be deducted from `wage`.
///
/// # Example
///
/// ```
/// use roundup_engine::calculation::eligible_deduction;
/// use roundup_engine::config::TaxSchedule;
/// use rust_decimal::Decimal;
///
/// let rules = TaxSchedule::default().deduction;
/// let deduction = eligible_deduction(Decimal::from(500_000), Decimal::from(1_500_000), &rules);
/// assert_eq!(deduction, Decimal::from(150_000));
/// ```
pub fn eligible_deduction(invested: Decimal, wage: Decimal, rules: &DeductionRules) -> Decimal {
    invested.min(wage * rules.wage_fraction).min(rules.cap)
}

/// The result of computing a tax benefit, including the audit step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBenefitResult {
    /// The deduction claimed against the wage.
    pub eligible_deduction: Decimal,
    /// Tax on the full wage.
    pub tax_without_deduction: Decimal,
    /// Tax on the wage after the deduction.
    pub tax_with_deduction: Decimal,
    /// `tax_without_deduction - tax_with_deduction`, unrounded.
    pub benefit: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Computes the tax saved by investing `invested` out of `wage`.
///
/// # Errors
///
/// Returns [`EngineError::CalculationError`] if the deducted wage leaves
/// the decimal range.
///
/// # Example
///
/// ```
/// use roundup_engine::calculation::calculate_tax_benefit;
/// use roundup_engine::config::TaxSchedule;
/// use rust_decimal::Decimal;
///
/// let result = calculate_tax_benefit(
///     Decimal::from(100_000),
///     Decimal::from(1_500_000),
///     &TaxSchedule::default(),
///     1,
/// )
/// .unwrap();
/// assert_eq!(result.benefit, Decimal::from(20_000));
/// ```
pub fn calculate_tax_benefit(
    invested: Decimal,
    wage: Decimal,
    schedule: &TaxSchedule,
    step_number: u32,
) -> EngineResult<TaxBenefitResult> {
    let deduction = eligible_deduction(invested, wage, &schedule.deduction);
    let deducted_wage = wage
        .checked_sub(deduction)
        .ok_or_else(|| EngineError::CalculationError {
            message: format!(
                "Wage {} minus deduction {} overflowed",
                wage.normalize(),
                deduction.normalize()
            ),
        })?;
    let tax_without_deduction = calculate_tax(wage, schedule);
    let tax_with_deduction = calculate_tax(deducted_wage, schedule);
    let benefit = tax_without_deduction - tax_with_deduction;

    let audit_step = AuditStep {
        step_number,
        rule_id: "tax_benefit".to_string(),
        rule_name: "Tax Benefit".to_string(),
        input: serde_json::json!({
            "invested": invested.normalize().to_string(),
            "wage": wage.normalize().to_string()
        }),
        output: serde_json::json!({
            "eligible_deduction": deduction.normalize().to_string(),
            "tax_without_deduction": tax_without_deduction.normalize().to_string(),
            "tax_with_deduction": tax_with_deduction.normalize().to_string(),
            "benefit": benefit.normalize().to_string()
        }),
        reasoning: format!(
            "tax({}) - tax({} - {}) = {} - {} = {}",
            wage.normalize(),
            wage.normalize(),
            deduction.normalize(),
            tax_without_deduction.normalize(),
            tax_with_deduction.normalize(),
            benefit.normalize()
        ),
    };

    Ok(TaxBenefitResult {
        eligible_deduction: deduction,
        tax_without_deduction,
        tax_with_deduction,
        benefit,
        audit_step,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn tax(income: &str) -> Decimal {
        calculate_tax(dec(income), &TaxSchedule::default())
    }

    /// TAX-001: income at or below 700000 pays nothing
    #[test]
    fn test_tax_001_below_threshold() {
        assert_eq!(tax("0"), dec("0"));
        assert_eq!(tax("500000"), dec("0"));
        assert_eq!(tax("700000"), dec("0"));
    }

    /// TAX-002: first taxed band
    #[test]
    fn test_tax_002_first_band() {
        assert_eq!(tax("800000"), dec("10000"));
        assert_eq!(tax("700001"), dec("0.1"));
    }

    /// TAX-003: band boundaries accumulate exactly
    #[test]
    fn test_tax_003_band_boundaries() {
        assert_eq!(tax("1000000"), dec("30000"));
        assert_eq!(tax("1200000"), dec("60000"));
        assert_eq!(tax("1500000"), dec("120000"));
    }

    /// TAX-004: top band
    #[test]
    fn test_tax_004_above_top_threshold() {
        assert_eq!(tax("2000000"), dec("270000"));
    }

    #[test]
    fn test_tax_is_zero_for_negative_income() {
        assert_eq!(tax("-100"), dec("0"));
    }

    #[test]
    fn test_tax_with_custom_schedule() {
        let schedule = TaxSchedule {
            brackets: vec![crate::config::TaxBracket {
                lower: dec("0"),
                rate: dec("0.25"),
            }],
            deduction: TaxSchedule::default().deduction,
        };
        assert_eq!(calculate_tax(dec("1000"), &schedule), dec("250"));
    }

    #[test]
    fn test_eligible_deduction_takes_smallest_limit() {
        let rules = TaxSchedule::default().deduction;

        // invested is smallest
        assert_eq!(
            eligible_deduction(dec("145"), dec("1000000"), &rules),
            dec("145")
        );
        // 10% of wage is smallest
        assert_eq!(
            eligible_deduction(dec("500000"), dec("1000000"), &rules),
            dec("100000")
        );
        // absolute cap is smallest
        assert_eq!(
            eligible_deduction(dec("500000"), dec("5000000"), &rules),
            dec("200000")
        );
    }

    #[test]
    fn test_benefit_zero_for_low_wage() {
        let result =
            calculate_tax_benefit(dec("145"), dec("50000"), &TaxSchedule::default(), 1).unwrap();
        assert_eq!(result.benefit, dec("0"));
    }

    #[test]
    fn test_benefit_for_wage_in_top_band() {
        let result =
            calculate_tax_benefit(dec("100000"), dec("1500000"), &TaxSchedule::default(), 1).unwrap();

        assert_eq!(result.eligible_deduction, dec("100000"));
        assert_eq!(result.tax_without_deduction, dec("120000"));
        assert_eq!(result.tax_with_deduction, dec("100000"));
        assert_eq!(result.benefit, dec("20000"));
    }

    #[test]
    fn test_benefit_spanning_two_bands() {
        // deduction 100000 takes 1050000 down to 950000
        let result =
            calculate_tax_benefit(dec("100000"), dec("1050000"), &TaxSchedule::default(), 1).unwrap();

        assert_eq!(result.tax_without_deduction, dec("37500"));
        assert_eq!(result.tax_with_deduction, dec("25000"));
        assert_eq!(result.benefit, dec("12500"));
    }

    #[test]
    fn test_benefit_audit_step() {
        let result =
            calculate_tax_benefit(dec("100000"), dec("1500000"), &TaxSchedule::default(), 7).unwrap();

        assert_eq!(result.audit_step.step_number, 7);
        assert_eq!(result.audit_step.rule_id, "tax_benefit");
        assert_eq!(
            result.audit_step.output["benefit"].as_str().unwrap(),
            "20000"
        );
        assert!(result.audit_step.reasoning.contains("tax(1500000)"));
    }

    #[test]
    fn test_benefit_overflowing_deduction_is_error() {
        let result = calculate_tax_benefit(
            -Decimal::MAX,
            dec("10000000000000000000000000000"),
            &TaxSchedule::default(),
            1,
        );
        assert!(matches!(result, Err(EngineError::CalculationError { .. })));
    }
}
