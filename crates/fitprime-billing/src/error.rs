use thiserror::Error;

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("Invalid billing plan: {identifier}")]
    InvalidPlan { identifier: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BillingError>;
