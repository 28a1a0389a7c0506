use super::envelope::Fields;
use super::invoice::Invoice;
use super::order::Order;
use super::transaction::{NewTransaction, Transaction};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Host persistence for local transactions.
#[async_trait]
pub trait TransactionRegistrar: Send + Sync {
    /// Records a new transaction and returns it with its issued id.
    async fn register(&self, tx: NewTransaction) -> Result<Transaction>;
    /// Finds the latest parentless subscription transaction of an order for
    /// one provider.
    async fn find_root(
        &self,
        order_type: &str,
        order_id: &str,
        provider: &str,
    ) -> Result<Option<Transaction>>;
}

/// Consumer of normalized invoices.
///
/// Gateways redeliver callbacks, so implementations must tolerate the same
/// invoice arriving more than once, in any order.
#[async_trait]
pub trait TransactionManager: Send + Sync {
    async fn process(&self, invoice: Invoice) -> Result<()>;
}

/// Server-to-server HTTP, supplied by the host.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// POSTs a URL-encoded form and returns the response body.
    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<String>;
}

/// Hook that may rewrite the checkout field map before it is signed.
pub trait PaymentParamsObserver: Send + Sync {
    fn on_params(&self, fields: &mut Fields, order: &dyn Order);
}

pub type SharedTransactionRegistrar = Arc<dyn TransactionRegistrar>;
pub type SharedTransactionManager = Arc<dyn TransactionManager>;
pub type SharedHttpTransport = Arc<dyn HttpTransport>;
pub type SharedPaymentParamsObserver = Arc<dyn PaymentParamsObserver>;
