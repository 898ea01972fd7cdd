use crate::domain::advisor::{should_recommend_upgrade, suggest_upgrade};
use crate::domain::plans::PlanCatalog;
use crate::domain::types::{ChargeAmount, OverageCalculation};
use crate::error::Result;
use rust_decimal::Decimal;

// Report text is fixed-locale: English narrative, BRL currency. A locale
// parameter only becomes worthwhile if the operator surface ever leaves
// the Brazilian deployment.

fn brl(amount: ChargeAmount) -> String {
    format!("R$ {}", amount)
}

fn brl_decimal(amount: Decimal) -> String {
    format!("R$ {:.2}", amount)
}

/// One-paragraph summary of a billing evaluation.
pub fn format_summary(calculation: &OverageCalculation) -> String {
    if calculation.is_within_limit() {
        format!(
            "Plan {}: {} of {} students in use. No overage this cycle; \
             the accumulated balance stands at {}.",
            calculation.plan,
            calculation.current_students,
            calculation.included_students,
            brl(calculation.running_balance),
        )
    } else {
        format!(
            "Plan {}: {} students against an allowance of {}. \
             {} over at {} each adds {} this cycle, for an accumulated \
             balance of {}. Next charge on {}.",
            calculation.plan,
            calculation.current_students,
            calculation.included_students,
            calculation.overage_students,
            brl_decimal(calculation.unit_price),
            brl(calculation.period_charge),
            brl(calculation.running_balance),
            calculation.next_charge_date.format("%Y-%m-%d"),
        )
    }
}

/// Full operator report for a billing evaluation.
///
/// Selects one of three narratives: within the allowance, over the
/// allowance without an upgrade recommendation, or over the allowance
/// with one. No new computation happens here beyond re-running the
/// advisor over the already-computed calculation.
pub fn generate_report(
    catalog: &PlanCatalog,
    calculation: &OverageCalculation,
    current_plan_price: Decimal,
) -> Result<String> {
    let summary = format_summary(calculation);

    if calculation.is_within_limit() {
        return Ok(summary);
    }

    if should_recommend_upgrade(calculation, current_plan_price) {
        let suggestion = suggest_upgrade(catalog, calculation.plan.as_str(), calculation)?;
        if let Some(suggestion) = suggestion {
            return Ok(format!(
                "{summary} Recommendation: moving to the {} plan would cover \
                 this usage and save {} per cycle.",
                suggestion.next_plan,
                brl(suggestion.savings),
            ));
        }
        // Over the top tier's allowance with nowhere left to go.
        return Ok(format!(
            "{summary} Usage exceeds the largest plan; a custom arrangement \
             may be warranted."
        ));
    }

    Ok(format!(
        "{summary} Usage is close to the allowance; no plan change is \
         warranted at this level."
    ))
}
