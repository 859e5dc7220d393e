//! Temporal rule resolution.
//!
//! Two rule families adjust a record's remanent, always in this order:
//!
//! 1. **Overrides** (q): among the periods containing the record's instant,
//!    the one with the latest start replaces the remanent. Ties on start keep
//!    the first listed period.
//! 2. **Additions** (p): every period containing the instant adds its extra
//!    on top of the (possibly overridden) remanent.
//!
//! Under [`ZeroRemanentPolicy::Exclude`] a record whose resolved remanent is
//! zero is then dropped as "no savings event".

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{AdditionRule, AuditStep, OverrideRule, ZeroRemanentPolicy};

use super::date_parser::format_instant;
use super::projection::checked_sum;

/// The result of resolving overrides for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideResolution {
    /// The remanent after resolution.
    pub remanent: Decimal,
    /// Index of the winning override, if any period matched.
    pub winner: Option<usize>,
    /// The audit step, present only when an override won.
    pub audit_step: Option<AuditStep>,
}

/// The result of applying additions to one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionResolution {
    /// The remanent after every matching extra was added.
    pub remanent: Decimal,
    /// Indices of every matching addition, in list order.
    pub matched: Vec<usize>,
    /// The audit step, present only when at least one addition matched.
    pub audit_step: Option<AuditStep>,
}

/// Picks the override period that applies at `instant`.
///
/// Only a strictly later start replaces the current candidate, so among
/// periods sharing the latest start the first listed wins.
///
/// # Example
///
/// ```
/// use roundup_engine::calculation::{parse_period, select_override};
/// use roundup_engine::models::OverrideRule;
/// use rust_decimal::Decimal;
///
/// let rule = |start: &str, fixed: i64| OverrideRule {
///     range: parse_period("q", start, "2021-12-31 23:59:59").unwrap(),
///     fixed: Decimal::from(fixed),
/// };
/// let rules = [
///     rule("2021-01-01 00:00:00", 10),
///     rule("2021-06-01 00:00:00", 20),
///     rule("2021-06-01 00:00:00", 30),
/// ];
///
/// let instant = roundup_engine::calculation::parse_strict("2021-10-01 20:15:00").unwrap();
/// assert_eq!(select_override(instant, &rules), Some(1));
/// ```
pub fn select_override(instant: NaiveDateTime, rules: &[OverrideRule]) -> Option<usize> {
    rules
        .iter()
        .enumerate()
        .filter(|(_, rule)| rule.range.contains(instant))
        .fold(None, |best: Option<(usize, &OverrideRule)>, (i, rule)| match best {
            Some((_, current)) if rule.range.start <= current.range.start => best,
            _ => Some((i, rule)),
        })
        .map(|(i, _)| i)
}

/// Replaces `remanent` with the winning override's fixed value.
///
/// Leaves `remanent` unchanged when no override period contains `instant`.
pub fn resolve_override(
    instant: NaiveDateTime,
    remanent: Decimal,
    rules: &[OverrideRule],
    step_number: u32,
) -> OverrideResolution {
    let Some(winner) = select_override(instant, rules) else {
        return OverrideResolution {
            remanent,
            winner: None,
            audit_step: None,
        };
    };

    let fixed = rules[winner].fixed;
    let audit_step = AuditStep {
        step_number,
        rule_id: "override_resolution".to_string(),
        rule_name: "Override Resolution".to_string(),
        input: serde_json::json!({
            "date": format_instant(instant),
            "remanent": remanent.normalize().to_string(),
            "candidates": rules.iter().filter(|r| r.range.contains(instant)).count()
        }),
        output: serde_json::json!({
            "winner": format!("q[{}]", winner),
            "remanent": fixed.normalize().to_string()
        }),
        reasoning: format!(
            "q[{}] has the latest start containing {}; remanent {} replaced by {}",
            winner,
            format_instant(instant),
            remanent.normalize(),
            fixed.normalize()
        ),
    };

    OverrideResolution {
        remanent: fixed,
        winner: Some(winner),
        audit_step: Some(audit_step),
    }
}

/// Adds the extra of every addition period containing `instant`.
///
/// # Errors
///
/// Returns [`EngineError::CalculationError`] if the stacked remanent leaves
/// the decimal range.
///
/// # Example
///
/// ```
/// use roundup_engine::calculation::{parse_period, parse_strict, resolve_additions};
/// use roundup_engine::models::AdditionRule;
/// use rust_decimal::Decimal;
///
/// let rule = |extra: i64| AdditionRule {
///     range: parse_period("p", "2021-10-01 00:00:00", "2021-10-31 23:59:59").unwrap(),
///     extra: Decimal::from(extra),
/// };
///
/// let instant = parse_strict("2021-10-01 20:15:00").unwrap();
/// let result = resolve_additions(instant, Decimal::from(50), &[rule(20), rule(5)], 1).unwrap();
/// assert_eq!(result.remanent, Decimal::from(75));
/// assert_eq!(result.matched, vec![0, 1]);
/// ```
pub fn resolve_additions(
    instant: NaiveDateTime,
    remanent: Decimal,
    rules: &[AdditionRule],
    step_number: u32,
) -> EngineResult<AdditionResolution> {
    let matched: Vec<usize> = rules
        .iter()
        .enumerate()
        .filter(|(_, rule)| rule.range.contains(instant))
        .map(|(i, _)| i)
        .collect();

    if matched.is_empty() {
        return Ok(AdditionResolution {
            remanent,
            matched,
            audit_step: None,
        });
    }

    let labels: Vec<String> = matched.iter().map(|i| format!("p[{}]", i)).collect();
    let extra = checked_sum(matched.iter().map(|&i| rules[i].extra), "addition extra")?;
    let resolved = remanent
        .checked_add(extra)
        .ok_or_else(|| EngineError::CalculationError {
            message: format!(
                "Remanent {} plus {} from {} overflowed",
                remanent.normalize(),
                extra.normalize(),
                labels.join(", ")
            ),
        })?;

    let audit_step = AuditStep {
        step_number,
        rule_id: "addition_stacking".to_string(),
        rule_name: "Addition Stacking".to_string(),
        input: serde_json::json!({
            "date": format_instant(instant),
            "remanent": remanent.normalize().to_string()
        }),
        output: serde_json::json!({
            "matched": labels,
            "extra": extra.normalize().to_string(),
            "remanent": resolved.normalize().to_string()
        }),
        reasoning: format!(
            "{} matching addition period(s) add {}: {} + {} = {}",
            matched.len(),
            extra.normalize(),
            remanent.normalize(),
            extra.normalize(),
            resolved.normalize()
        ),
    };

    Ok(AdditionResolution {
        remanent: resolved,
        matched,
        audit_step: Some(audit_step),
    })
}

/// A remanent after both rule families, with the steps that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRemanent {
    /// The final remanent.
    pub remanent: Decimal,
    /// Audit steps for the override win and the addition stacking, if any.
    pub audit_steps: Vec<AuditStep>,
}

/// Applies overrides, then additions, to one record's remanent.
///
/// Step numbers are taken from `next_step`, which is advanced once per
/// emitted step.
///
/// # Errors
///
/// Fails if applying the additions overflows.
pub fn resolve_remanent(
    instant: NaiveDateTime,
    remanent: Decimal,
    overrides: &[OverrideRule],
    additions: &[AdditionRule],
    next_step: &mut u32,
) -> EngineResult<ResolvedRemanent> {
    let mut audit_steps = Vec::new();

    let overridden = resolve_override(instant, remanent, overrides, *next_step);
    if let Some(step) = overridden.audit_step {
        audit_steps.push(step);
        *next_step += 1;
    }

    let added = resolve_additions(instant, overridden.remanent, additions, *next_step)?;
    if let Some(step) = added.audit_step {
        audit_steps.push(step);
        *next_step += 1;
    }

    Ok(ResolvedRemanent {
        remanent: added.remanent,
        audit_steps,
    })
}

/// Decides whether a resolved remanent is dropped from aggregation.
///
/// Returns the exclusion step when `policy` is
/// [`ZeroRemanentPolicy::Exclude`] and `remanent` is zero; `None` keeps the
/// record.
pub fn exclude_zero_remanent(
    instant: NaiveDateTime,
    remanent: Decimal,
    policy: ZeroRemanentPolicy,
    step_number: u32,
) -> Option<AuditStep> {
    if policy != ZeroRemanentPolicy::Exclude || !remanent.is_zero() {
        return None;
    }

    Some(AuditStep {
        step_number,
        rule_id: "zero_remanent_exclusion".to_string(),
        rule_name: "Zero Remanent Exclusion".to_string(),
        input: serde_json::json!({
            "date": format_instant(instant),
            "remanent": remanent.normalize().to_string()
        }),
        output: serde_json::json!({ "excluded": true }),
        reasoning: format!(
            "Resolved remanent at {} is zero; no savings event",
            format_instant(instant)
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::{parse_period, parse_strict};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn at(s: &str) -> NaiveDateTime {
        parse_strict(s).unwrap()
    }

    fn q(start: &str, end: &str, fixed: &str) -> OverrideRule {
        OverrideRule {
            range: parse_period("q", start, end).unwrap(),
            fixed: dec(fixed),
        }
    }

    fn p(start: &str, end: &str, extra: &str) -> AdditionRule {
        AdditionRule {
            range: parse_period("p", start, end).unwrap(),
            extra: dec(extra),
        }
    }

    const OCT_START: &str = "2021-10-01 00:00:00";
    const OCT_END: &str = "2021-10-31 23:59:59";

    /// RUL-001: no matching override leaves the remanent alone
    #[test]
    fn test_rul_001_no_override_match() {
        let rules = [q("2021-11-01 00:00:00", "2021-11-30 23:59:59", "50")];
        let result = resolve_override(at("2021-10-01 20:15:00"), dec("81"), &rules, 1);

        assert_eq!(result.remanent, dec("81"));
        assert_eq!(result.winner, None);
        assert!(result.audit_step.is_none());
    }

    /// RUL-002: a matching override replaces, never adds
    #[test]
    fn test_rul_002_override_replaces_remanent() {
        let rules = [q(OCT_START, OCT_END, "50")];
        let result = resolve_override(at("2021-10-01 20:15:00"), dec("81"), &rules, 1);

        assert_eq!(result.remanent, dec("50"));
        assert_eq!(result.winner, Some(0));
    }

    /// RUL-003: latest start wins
    #[test]
    fn test_rul_003_latest_start_wins() {
        let rules = [
            q("2021-10-01 00:00:00", OCT_END, "10"),
            q("2021-10-15 00:00:00", OCT_END, "20"),
            q("2021-10-05 00:00:00", OCT_END, "30"),
        ];
        let result = resolve_override(at("2021-10-20 12:00:00"), dec("81"), &rules, 1);

        assert_eq!(result.winner, Some(1));
        assert_eq!(result.remanent, dec("20"));
    }

    /// RUL-004: equal starts keep the first listed
    #[test]
    fn test_rul_004_tie_keeps_first_listed() {
        let rules = [
            q(OCT_START, "2021-10-20 00:00:00", "10"),
            q(OCT_START, OCT_END, "20"),
        ];
        let result = resolve_override(at("2021-10-10 12:00:00"), dec("81"), &rules, 1);

        assert_eq!(result.winner, Some(0));
        assert_eq!(result.remanent, dec("10"));
    }

    #[test]
    fn test_later_start_outside_instant_is_ignored() {
        let rules = [
            q(OCT_START, OCT_END, "10"),
            q("2021-10-25 00:00:00", OCT_END, "20"),
        ];
        let result = resolve_override(at("2021-10-10 12:00:00"), dec("81"), &rules, 1);
        assert_eq!(result.winner, Some(0));
    }

    #[test]
    fn test_override_boundaries_are_inclusive() {
        let rules = [q(OCT_START, OCT_END, "7")];

        for instant in [OCT_START, OCT_END] {
            let result = resolve_override(at(instant), dec("81"), &rules, 1);
            assert_eq!(result.remanent, dec("7"), "instant {}", instant);
        }
    }

    #[test]
    fn test_override_may_set_zero() {
        let rules = [q(OCT_START, OCT_END, "0")];
        let result = resolve_override(at("2021-10-01 20:15:00"), dec("81"), &rules, 1);
        assert_eq!(result.remanent, dec("0"));
    }

    #[test]
    fn test_override_audit_step() {
        let rules = [q(OCT_START, OCT_END, "50")];
        let result = resolve_override(at("2021-10-01 20:15:00"), dec("81"), &rules, 4);
        let step = result.audit_step.unwrap();

        assert_eq!(step.step_number, 4);
        assert_eq!(step.rule_id, "override_resolution");
        assert_eq!(step.input["remanent"], "81");
        assert_eq!(step.output["winner"], "q[0]");
        assert_eq!(step.output["remanent"], "50");
    }

    /// RUL-005: additions stack
    #[test]
    fn test_rul_005_additions_stack() {
        let rules = [
            p(OCT_START, OCT_END, "20"),
            p("2021-09-01 00:00:00", OCT_END, "5"),
            p("2021-11-01 00:00:00", "2021-11-30 23:59:59", "1000"),
        ];
        let result = resolve_additions(at("2021-10-01 20:15:00"), dec("50"), &rules, 1).unwrap();

        assert_eq!(result.remanent, dec("75"));
        assert_eq!(result.matched, vec![0, 1]);
    }

    #[test]
    fn test_identical_additions_each_count() {
        let rules = [p(OCT_START, OCT_END, "20"), p(OCT_START, OCT_END, "20")];
        let result = resolve_additions(at("2021-10-01 20:15:00"), dec("0"), &rules, 1).unwrap();
        assert_eq!(result.remanent, dec("40"));
    }

    #[test]
    fn test_no_additions_match() {
        let result = resolve_additions(at("2021-10-01 20:15:00"), dec("81"), &[], 1).unwrap();
        assert_eq!(result.remanent, dec("81"));
        assert!(result.matched.is_empty());
        assert!(result.audit_step.is_none());
    }

    /// RUL-006: override first, then additions on top
    #[test]
    fn test_rul_006_override_then_addition() {
        let mut next_step = 1;
        let resolved = resolve_remanent(
            at("2021-10-01 20:15:00"),
            dec("81"),
            &[q(OCT_START, OCT_END, "50")],
            &[p(OCT_START, OCT_END, "20")],
            &mut next_step,
        )
        .unwrap();

        assert_eq!(resolved.remanent, dec("70"));
        assert_eq!(resolved.audit_steps.len(), 2);
        assert_eq!(resolved.audit_steps[0].step_number, 1);
        assert_eq!(resolved.audit_steps[1].step_number, 2);
        assert_eq!(resolved.audit_steps[1].rule_id, "addition_stacking");
        assert_eq!(next_step, 3);
    }

    #[test]
    fn test_resolve_remanent_without_rules_emits_nothing() {
        let mut next_step = 9;
        let resolved =
            resolve_remanent(at("2021-10-01 20:15:00"), dec("81"), &[], &[], &mut next_step)
                .unwrap();

        assert_eq!(resolved.remanent, dec("81"));
        assert!(resolved.audit_steps.is_empty());
        assert_eq!(next_step, 9);
    }

    #[test]
    fn test_stacked_extras_overflow_is_error() {
        let rules = [
            p(OCT_START, OCT_END, "50000000000000000000000000000"),
            p(OCT_START, OCT_END, "50000000000000000000000000000"),
        ];
        let result = resolve_additions(at("2021-10-01 20:15:00"), dec("81"), &rules, 1);

        assert!(matches!(result, Err(EngineError::CalculationError { .. })));
    }

    #[test]
    fn test_extra_on_large_override_overflow_names_periods() {
        let mut next_step = 1;
        let result = resolve_remanent(
            at("2021-10-01 20:15:00"),
            dec("81"),
            &[q(OCT_START, OCT_END, "79228162514264337593543950335")],
            &[p(OCT_START, OCT_END, "1")],
            &mut next_step,
        );

        match result {
            Err(EngineError::CalculationError { message }) => {
                assert!(message.contains("p[0]"));
            }
            other => panic!("Expected CalculationError, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_remanent_excluded_under_exclude_policy() {
        let step = exclude_zero_remanent(
            at("2023-07-15 10:30:00"),
            dec("0"),
            ZeroRemanentPolicy::Exclude,
            3,
        )
        .unwrap();

        assert_eq!(step.step_number, 3);
        assert_eq!(step.rule_id, "zero_remanent_exclusion");
        assert_eq!(step.input["date"], "2023-07-15 10:30:00");
        assert_eq!(step.output["excluded"], true);
    }

    #[test]
    fn test_zero_remanent_kept_under_keep_policy() {
        let instant = at("2023-07-15 10:30:00");

        assert!(exclude_zero_remanent(instant, dec("0"), ZeroRemanentPolicy::Keep, 1).is_none());
        assert!(
            exclude_zero_remanent(instant, dec("0.01"), ZeroRemanentPolicy::Exclude, 1).is_none()
        );
    }
}
