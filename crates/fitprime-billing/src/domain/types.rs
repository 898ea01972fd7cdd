use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Subscription plan identifier.
///
/// Variants are declared from the smallest tier to the largest; the
/// derived ordering follows tier size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanId {
    Starter,
    Pro,
    Business,
    Premium,
    Enterprise,
}

impl PlanId {
    /// All plans, in ascending tier order.
    pub const ALL: [PlanId; 5] = [
        PlanId::Starter,
        PlanId::Pro,
        PlanId::Business,
        PlanId::Premium,
        PlanId::Enterprise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanId::Starter => "starter",
            PlanId::Pro => "pro",
            PlanId::Business => "business",
            PlanId::Premium => "premium",
            PlanId::Enterprise => "enterprise",
        }
    }

    /// The next larger tier, or `None` for the top tier.
    pub fn next(&self) -> Option<PlanId> {
        let position = Self::ALL.iter().position(|plan| plan == self)?;
        Self::ALL.get(position + 1).copied()
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Invoice currency amount, held at 2 decimal places.
///
/// Rounding happens when an amount is constructed. The crate only
/// constructs amounts at charge-computation and balance-accumulation
/// points; unit prices stay as raw `Decimal` until then, so repeated
/// evaluations do not compound rounding drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChargeAmount(Decimal);

impl ChargeAmount {
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn from_decimal(amount: Decimal) -> Self {
        Self(amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Charge for `units` billed at `unit_price`, rounded once here.
    pub fn from_units(units: u32, unit_price: Decimal) -> Self {
        Self::from_decimal(Decimal::from(units) * unit_price)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn add(&self, other: ChargeAmount) -> Self {
        Self::from_decimal(self.0 + other.0)
    }

    /// Positive difference `self - other`, floored at zero.
    pub fn saturating_sub(&self, other: ChargeAmount) -> Self {
        if self.0 > other.0 {
            Self::from_decimal(self.0 - other.0)
        } else {
            Self::zero()
        }
    }
}

impl fmt::Display for ChargeAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Result of one billing evaluation.
///
/// Ephemeral: constructed fresh per call and never stored by this crate.
/// The caller persists `running_balance` if it must carry into the next
/// cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverageCalculation {
    pub plan: PlanId,
    pub current_students: u32,
    pub included_students: u32,
    pub overage_students: u32,
    pub unit_price: Decimal,
    pub period_charge: ChargeAmount,
    pub running_balance: ChargeAmount,
    pub next_charge_date: NaiveDate,
}

impl OverageCalculation {
    pub fn is_within_limit(&self) -> bool {
        self.overage_students == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_charge_amount_arithmetic() {
        let charge1 = ChargeAmount::from_decimal(dec!(100.50));
        let charge2 = ChargeAmount::from_decimal(dec!(50.25));

        let sum = charge1.add(charge2);
        assert_eq!(sum.as_decimal(), dec!(150.75));

        let diff = charge1.saturating_sub(charge2);
        assert_eq!(diff.as_decimal(), dec!(50.25));

        assert!(charge2.saturating_sub(charge1).is_zero());
    }

    #[test]
    fn test_charge_amount_rounds_half_away_from_zero() {
        assert_eq!(
            ChargeAmount::from_decimal(dec!(1.005)).as_decimal(),
            dec!(1.01)
        );
        assert_eq!(
            ChargeAmount::from_decimal(dec!(1.004)).as_decimal(),
            dec!(1.00)
        );
    }

    #[test]
    fn test_charge_from_units_rounds_at_charge_step() {
        // 3 * 6.47 = 19.41, already exact at 2 dp
        let charge = ChargeAmount::from_units(3, dec!(6.47));
        assert_eq!(charge.as_decimal(), dec!(19.41));

        // 7 * 1.333 = 9.331 rounds to 9.33 only after the multiply
        let charge = ChargeAmount::from_units(7, dec!(1.333));
        assert_eq!(charge.as_decimal(), dec!(9.33));
    }

    #[test]
    fn test_plan_id_order_and_successor() {
        assert!(PlanId::Starter < PlanId::Pro);
        assert!(PlanId::Premium < PlanId::Enterprise);

        assert_eq!(PlanId::Starter.next(), Some(PlanId::Pro));
        assert_eq!(PlanId::Premium.next(), Some(PlanId::Enterprise));
        assert_eq!(PlanId::Enterprise.next(), None);
    }

    #[test]
    fn test_plan_id_display_matches_wire_names() {
        for plan in PlanId::ALL {
            assert_eq!(plan.to_string(), plan.as_str());
        }
        assert_eq!(PlanId::Business.as_str(), "business");
    }
}
