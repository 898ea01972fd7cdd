use crate::domain::plans::PlanCatalog;
use crate::domain::types::{ChargeAmount, OverageCalculation, PlanId};
use crate::error::Result;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Thresholds for nudging a tenant toward the next tier.
pub struct AdvisorRules;

impl AdvisorRules {
    /// Overage beyond this share of the allowance triggers a recommendation.
    pub const OVERAGE_RATIO_THRESHOLD: Decimal = dec!(0.10);
    /// Accumulated balance beyond this share of the base subscription
    /// price triggers one.
    pub const BALANCE_RATIO_THRESHOLD: Decimal = dec!(0.50);
}

/// Advice to move to the next tier, with the per-cycle savings it buys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeSuggestion {
    pub next_plan: PlanId,
    pub savings: ChargeAmount,
}

/// Whether the tenant should be nudged toward the next tier.
///
/// Either condition triggers: overage above 10% of the allowance, or an
/// accumulated balance above 50% of `current_plan_price`. The price is a
/// caller-supplied input that must be positive for the balance test to be
/// meaningful; a non-positive price disables that arm.
pub fn should_recommend_upgrade(
    calculation: &OverageCalculation,
    current_plan_price: Decimal,
) -> bool {
    let overage_ratio =
        Decimal::from(calculation.overage_students) / Decimal::from(calculation.included_students);

    let triggered = overage_ratio > AdvisorRules::OVERAGE_RATIO_THRESHOLD
        || (current_plan_price > Decimal::ZERO
            && calculation.running_balance.as_decimal() / current_plan_price
                > AdvisorRules::BALANCE_RATIO_THRESHOLD);

    if triggered {
        warn!(
            plan = %calculation.plan,
            overage_students = calculation.overage_students,
            running_balance = %calculation.running_balance,
            "overage level warrants an upgrade recommendation"
        );
    }

    triggered
}

/// Suggest the next tier up from the current plan.
///
/// Recomputes what `current_students` would cost against the next tier's
/// allowance and rate; `savings` is the positive difference from the
/// current-tier charge, floored at zero so a suggestion is never
/// presented as a loss.
///
/// An unknown plan identifier errors the same way
/// [`OverageCalculator::calculate`] does rather than blending into the
/// top-tier case; the top tier itself yields `Ok(None)`.
///
/// [`OverageCalculator::calculate`]: crate::domain::overage::OverageCalculator::calculate
pub fn suggest_upgrade(
    catalog: &PlanCatalog,
    current_plan_identifier: &str,
    calculation: &OverageCalculation,
) -> Result<Option<UpgradeSuggestion>> {
    let current = catalog.resolve(current_plan_identifier)?;

    let next = match current.id.next().and_then(|id| catalog.get(id)) {
        Some(next) => next,
        None => return Ok(None),
    };

    let next_overage = calculation
        .current_students
        .saturating_sub(next.included_students);
    let next_charge = ChargeAmount::from_units(next_overage, next.overage_unit_price);
    let savings = calculation.period_charge.saturating_sub(next_charge);

    Ok(Some(UpgradeSuggestion {
        next_plan: next.id,
        savings,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::overage::OverageCalculator;
    use crate::error::BillingError;
    use crate::time::FixedTimeSource;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn calculator() -> OverageCalculator {
        let instant = Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap();
        OverageCalculator::new(PlanCatalog::default()).with_clock(Arc::new(FixedTimeSource(instant)))
    }

    #[test]
    fn test_recommends_when_overage_exceeds_ten_percent_of_allowance() {
        // 3 over on a 15-student allowance is 20%
        let calc = calculator()
            .calculate("starter", 18, ChargeAmount::zero())
            .unwrap();

        assert_eq!(calc.overage_students, 3);
        assert!(should_recommend_upgrade(&calc, dec!(97)));
    }

    #[test]
    fn test_no_recommendation_for_small_overage_and_balance() {
        // 1 over on 15 is ~6.7%; charge 6.47 against a 97 base price is
        // well under the 50% balance trigger
        let calc = calculator()
            .calculate("starter", 16, ChargeAmount::zero())
            .unwrap();

        assert_eq!(calc.overage_students, 1);
        assert!(!should_recommend_upgrade(&calc, dec!(97)));
    }

    #[test]
    fn test_recommends_on_accumulated_balance_alone() {
        // 1 student over stays below the ratio trigger, but carrying
        // several cycles of unbilled overage crosses the balance one
        let calc = calculator()
            .calculate("starter", 16, ChargeAmount::from_decimal(dec!(45.00)))
            .unwrap();

        assert_eq!(calc.running_balance.as_decimal(), dec!(51.47));
        assert!(should_recommend_upgrade(&calc, dec!(97)));
    }

    #[test]
    fn test_non_positive_plan_price_disables_balance_arm() {
        let calc = calculator()
            .calculate("starter", 16, ChargeAmount::from_decimal(dec!(1000)))
            .unwrap();

        assert!(!should_recommend_upgrade(&calc, Decimal::ZERO));
        assert!(!should_recommend_upgrade(&calc, dec!(-10)));
    }

    #[test]
    fn test_suggests_next_tier_with_savings() {
        let calc = calculator()
            .calculate("starter", 20, ChargeAmount::zero())
            .unwrap();
        assert_eq!(calc.period_charge.as_decimal(), dec!(32.35));

        let suggestion = suggest_upgrade(&PlanCatalog::default(), "starter", &calc)
            .unwrap()
            .unwrap();

        // 20 students fit inside pro's 25-student allowance, so the whole
        // current charge is saved
        assert_eq!(suggestion.next_plan, PlanId::Pro);
        assert_eq!(suggestion.savings.as_decimal(), dec!(32.35));
    }

    #[test]
    fn test_savings_on_deep_overage_spanning_both_allowances() {
        // Deep overage on pro: 100 students is 75 over pro (25 included)
        // and 50 over business (50 included); business still charges
        // 50 * 5.47 = 273.50 against pro's 75 * 5.97 = 447.75
        let calc = calculator()
            .calculate("pro", 100, ChargeAmount::zero())
            .unwrap();

        let suggestion = suggest_upgrade(&PlanCatalog::default(), "pro", &calc)
            .unwrap()
            .unwrap();

        assert_eq!(suggestion.next_plan, PlanId::Business);
        assert_eq!(suggestion.savings.as_decimal(), dec!(174.25));
    }

    #[test]
    fn test_top_tier_has_no_suggestion() {
        let calc = calculator()
            .calculate("enterprise", 500, ChargeAmount::zero())
            .unwrap();

        let suggestion = suggest_upgrade(&PlanCatalog::default(), "enterprise", &calc).unwrap();
        assert_eq!(suggestion, None);
    }

    #[test]
    fn test_unknown_plan_errors_instead_of_silent_no_suggestion() {
        let calc = calculator()
            .calculate("starter", 20, ChargeAmount::zero())
            .unwrap();

        let err = suggest_upgrade(&PlanCatalog::default(), "no_such_plan", &calc).unwrap_err();
        assert!(matches!(err, BillingError::InvalidPlan { .. }));
    }
}
