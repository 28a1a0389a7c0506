use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Failure,
    Successful,
    Refund,
    Canceled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Payment,
    Refund,
    Subscription,
}

/// A normalized payment-lifecycle event handed to the transaction manager.
///
/// `order_id` is the correlation token the gateway echoes back, i.e. the local
/// transaction id, not the host's order key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub provider: String,
    pub payment_id: String,
    pub order_id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub status: InvoiceStatus,
    pub amount: Decimal,
    pub fee: Decimal,
}

impl Invoice {
    /// Key under which re-delivered callbacks collapse.
    pub fn idempotency_key(&self) -> (String, InvoiceStatus) {
        (self.payment_id.clone(), self.status)
    }
}
