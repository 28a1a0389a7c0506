use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Successful,
    Failure,
    Refund,
    Canceled,
}

/// A local transaction record, owned by the host's persistence.
///
/// `transaction_id` is what the gateway sees as `order_id`. A subscription's
/// root transaction has no parent; its charges point back to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub order_type: String,
    pub order_id: String,
    pub provider: String,
    pub parent_id: Option<String>,
    pub subscription: bool,
    pub amount: Decimal,
    pub currency: String,
    pub status: TransactionStatus,
    pub options: BTreeMap<String, String>,
}

impl Transaction {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// What the request builder asks the registrar to record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub order_type: String,
    pub order_id: String,
    pub provider: String,
    pub subscription: bool,
    pub amount: Decimal,
    pub currency: String,
    pub options: BTreeMap<String, String>,
}
