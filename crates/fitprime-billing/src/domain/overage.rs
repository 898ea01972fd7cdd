use crate::domain::plans::PlanCatalog;
use crate::domain::types::{ChargeAmount, OverageCalculation};
use crate::error::Result;
use crate::time::{SystemTimeSource, TimeSource};
use chrono::Duration;
use std::sync::Arc;
use tracing::info;

/// Days between a billing evaluation and its scheduled charge.
pub const DEFAULT_CHARGE_PERIOD_DAYS: i64 = 30;

/// Computes per-cycle overage charges against a plan catalog.
///
/// Stateless apart from its catalog and clock: every call is an
/// independent computation over its inputs, so concurrent callers need
/// no coordination.
pub struct OverageCalculator {
    catalog: PlanCatalog,
    clock: Arc<dyn TimeSource>,
    charge_period_days: i64,
}

impl OverageCalculator {
    pub fn new(catalog: PlanCatalog) -> Self {
        Self {
            catalog,
            clock: Arc::new(SystemTimeSource),
            charge_period_days: DEFAULT_CHARGE_PERIOD_DAYS,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_charge_period_days(mut self, days: i64) -> Self {
        self.charge_period_days = days;
        self
    }

    pub fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }

    /// Evaluate the overage charge for one billing cycle.
    ///
    /// `prior_balance` is unbilled overage carried from earlier cycles.
    /// It passes through into `running_balance` untouched when the count
    /// is within the allowance; callers with nothing outstanding pass
    /// [`ChargeAmount::zero`]. Fails with [`BillingError::InvalidPlan`]
    /// when the identifier resolves to no tier.
    ///
    /// [`BillingError::InvalidPlan`]: crate::error::BillingError::InvalidPlan
    pub fn calculate(
        &self,
        plan_identifier: &str,
        current_students: u32,
        prior_balance: ChargeAmount,
    ) -> Result<OverageCalculation> {
        let tier = self.catalog.resolve(plan_identifier)?;

        let overage_students = current_students.saturating_sub(tier.included_students);
        let period_charge = ChargeAmount::from_units(overage_students, tier.overage_unit_price);
        let running_balance = prior_balance.add(period_charge);

        // Calendar-day addition on a date-only value.
        let next_charge_date =
            self.clock.now().date_naive() + Duration::days(self.charge_period_days);

        let calculation = OverageCalculation {
            plan: tier.id,
            current_students,
            included_students: tier.included_students,
            overage_students,
            unit_price: tier.overage_unit_price,
            period_charge,
            running_balance,
            next_charge_date,
        };

        info!(
            plan = %tier.id,
            current_students,
            overage_students,
            period_charge = %period_charge,
            running_balance = %running_balance,
            "computed period overage"
        );

        Ok(calculation)
    }
}
