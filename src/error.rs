use crate::domain::order::Periodicity;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("LiqPay supports only month and year periodicity, got {0}")]
    UnsupportedPeriodicity(Periodicity),
    #[error("Invalid version: expected {expected}, got {actual}")]
    InvalidVersion { expected: u32, actual: u32 },
    #[error("Invalid public key")]
    InvalidPublicKey,
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Malformed callback: {0}")]
    MalformedCallback(String),
    #[error("No root transaction for order {order_type}#{order_id}")]
    TransactionNotFound { order_type: String, order_id: String },
    #[error("Transport error: {0}")]
    TransportError(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Store error: {0}")]
    StoreError(String),
}

impl GatewayError {
    /// True for the callback failures that point at tampering or misconfiguration.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            GatewayError::InvalidVersion { .. }
                | GatewayError::InvalidPublicKey
                | GatewayError::InvalidSignature
        )
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
