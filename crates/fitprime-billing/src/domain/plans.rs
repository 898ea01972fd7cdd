use crate::domain::types::PlanId;
use crate::error::{BillingError, Result};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A subscription tier: how many students the base subscription covers
/// and what each student beyond that costs per billing cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanTier {
    pub id: PlanId,
    pub included_students: u32,
    pub overage_unit_price: Decimal,
}

/// Production tier table. Allowances grow and marginal prices shrink as
/// tiers ascend; `test_default_catalog_pricing_monotonic` pins that.
static DEFAULT_TIERS: Lazy<Vec<PlanTier>> = Lazy::new(|| {
    vec![
        PlanTier {
            id: PlanId::Starter,
            included_students: 15,
            overage_unit_price: dec!(6.47),
        },
        PlanTier {
            id: PlanId::Pro,
            included_students: 25,
            overage_unit_price: dec!(5.97),
        },
        PlanTier {
            id: PlanId::Business,
            included_students: 50,
            overage_unit_price: dec!(5.47),
        },
        PlanTier {
            id: PlanId::Premium,
            included_students: 100,
            overage_unit_price: dec!(4.97),
        },
        PlanTier {
            id: PlanId::Enterprise,
            included_students: 200,
            overage_unit_price: dec!(4.47),
        },
    ]
});

/// Immutable tier table, ordered from the smallest plan to the largest.
///
/// Built once (defaults or validated configuration) and never mutated;
/// shared freely across threads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanCatalog {
    tiers: Vec<PlanTier>,
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self {
            tiers: DEFAULT_TIERS.clone(),
        }
    }
}

impl PlanCatalog {
    /// Build a catalog from externally supplied tiers (configuration).
    ///
    /// The table is sorted into tier order, then rejected if it is empty,
    /// repeats a plan, or breaks pricing monotonicity: included students
    /// must strictly increase and the overage unit price strictly
    /// decrease from one tier to the next.
    pub fn from_tiers(mut tiers: Vec<PlanTier>) -> Result<Self> {
        if tiers.is_empty() {
            return Err(BillingError::Config("plan catalog is empty".to_string()));
        }
        tiers.sort_by_key(|tier| tier.id);

        if tiers[0].included_students == 0 {
            return Err(BillingError::Config(format!(
                "plan '{}' has a zero student allowance",
                tiers[0].id
            )));
        }
        for pair in tiers.windows(2) {
            if pair[1].id == pair[0].id {
                return Err(BillingError::Config(format!(
                    "plan '{}' appears more than once in the catalog",
                    pair[0].id
                )));
            }
            if pair[1].included_students <= pair[0].included_students {
                return Err(BillingError::Config(format!(
                    "allowance does not increase from '{}' to '{}'",
                    pair[0].id, pair[1].id
                )));
            }
            if pair[1].overage_unit_price >= pair[0].overage_unit_price {
                return Err(BillingError::Config(format!(
                    "overage price does not decrease from '{}' to '{}'",
                    pair[0].id, pair[1].id
                )));
            }
        }
        if let Some(last) = tiers.last() {
            if last.overage_unit_price <= Decimal::ZERO {
                return Err(BillingError::Config(format!(
                    "plan '{}' has a non-positive overage price",
                    last.id
                )));
            }
        }

        Ok(Self { tiers })
    }

    /// Tiers in ascending order.
    pub fn tiers(&self) -> &[PlanTier] {
        &self.tiers
    }

    pub fn get(&self, id: PlanId) -> Option<&PlanTier> {
        self.tiers.iter().find(|tier| tier.id == id)
    }

    /// Resolve a free-form plan identifier to its tier.
    ///
    /// Tenant records carry the plan in whatever shape the upstream app
    /// wrote it: bare ("starter"), shouted ("STARTER"), or namespaced SKU
    /// ("FitPrime_BR_Starter"). Matching normalizes the input and accepts
    /// a tier whose canonical name the normalized string ends with.
    /// Anything else is a [`BillingError::InvalidPlan`]; there is no
    /// fallback tier, a mismatch must never silently charge some other
    /// plan's rates.
    pub fn resolve(&self, identifier: &str) -> Result<&PlanTier> {
        let normalized = normalize_plan_identifier(identifier);
        let tier = self
            .tiers
            .iter()
            .find(|tier| normalized == tier.id.as_str())
            .or_else(|| {
                self.tiers
                    .iter()
                    .find(|tier| normalized.ends_with(tier.id.as_str()))
            });

        match tier {
            Some(tier) => {
                debug!(identifier, normalized = %normalized, plan = %tier.id, "resolved billing plan");
                Ok(tier)
            }
            None => Err(BillingError::InvalidPlan {
                identifier: identifier.to_string(),
            }),
        }
    }
}

/// Lower-case the identifier and strip everything that is not an ASCII
/// letter. Digits and separators are dropped indiscriminately; see the
/// resolution notes on [`PlanCatalog::resolve`].
pub fn normalize_plan_identifier(identifier: &str) -> String {
    identifier
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
