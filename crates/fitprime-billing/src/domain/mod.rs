pub mod advisor;
pub mod overage;
pub mod plans;
pub mod report;
pub mod types;

pub use advisor::{should_recommend_upgrade, suggest_upgrade, AdvisorRules, UpgradeSuggestion};
pub use overage::OverageCalculator;
pub use plans::{normalize_plan_identifier, PlanCatalog, PlanTier};
pub use types::{ChargeAmount, OverageCalculation, PlanId};
