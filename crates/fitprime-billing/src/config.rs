use crate::domain::overage::{OverageCalculator, DEFAULT_CHARGE_PERIOD_DAYS};
use crate::domain::plans::{PlanCatalog, PlanTier};
use crate::error::{BillingError, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Billing configuration: the plan catalog and charge scheduling.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BillingConfig {
    /// Days from a billing evaluation to its scheduled charge.
    pub charge_period_days: i64,
    /// Tier table; defaults to the built-in catalog.
    pub plans: Vec<PlanTier>,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            charge_period_days: DEFAULT_CHARGE_PERIOD_DAYS,
            plans: PlanCatalog::default().tiers().to_vec(),
        }
    }
}

impl BillingConfig {
    /// Layered load: serialized defaults, then an optional TOML file
    /// (`billing.toml` when no path is given), then `BILLING_`-prefixed
    /// environment variables.
    pub fn load(path_override: Option<PathBuf>) -> Result<Self> {
        let default_config = BillingConfig::default();
        let mut figment = Figment::from(Serialized::defaults(default_config));

        if let Some(path) = path_override {
            if path.exists() {
                figment = figment.merge(Toml::file(&path));
            }
        } else {
            let default_path = PathBuf::from("billing.toml");
            if default_path.exists() {
                figment = figment.merge(Toml::file(default_path));
            }
        }

        figment = figment.merge(Env::prefixed("BILLING_"));

        let config: BillingConfig = figment
            .extract()
            .map_err(|e| BillingError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    fn validate(&self) -> Result<()> {
        if self.charge_period_days <= 0 {
            return Err(BillingError::Config(
                "charge_period_days must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// The validated catalog described by this configuration. A table
    /// that breaks the pricing monotonicity is a configuration error, not
    /// a billable state.
    pub fn catalog(&self) -> Result<PlanCatalog> {
        PlanCatalog::from_tiers(self.plans.clone())
    }

    /// Calculator wired from this configuration.
    pub fn calculator(&self) -> Result<OverageCalculator> {
        Ok(OverageCalculator::new(self.catalog()?)
            .with_charge_period_days(self.charge_period_days))
    }
}
