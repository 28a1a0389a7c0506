use crate::domain::invoice::{Invoice, InvoiceStatus, TransactionType};
use crate::domain::ports::{TransactionManager, TransactionRegistrar};
use crate::domain::transaction::{NewTransaction, Transaction, TransactionStatus};
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Ledger {
    transactions: Vec<Transaction>,
    index: HashMap<String, usize>,
}

/// A thread-safe in-memory transaction registrar.
///
/// Issues random UUIDs as transaction ids, so the same order can be paid for
/// many times without its correlation tokens colliding. Transactions keep
/// their registration order.
#[derive(Default, Clone)]
pub struct InMemoryTransactionRegistrar {
    ledger: Arc<RwLock<Ledger>>,
}

impl InMemoryTransactionRegistrar {
    /// Creates a new, empty registrar.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, transaction_id: &str) -> Option<Transaction> {
        let ledger = self.ledger.read().await;
        ledger
            .index
            .get(transaction_id)
            .map(|&i| ledger.transactions[i].clone())
    }

    pub async fn set_status(&self, transaction_id: &str, status: TransactionStatus) -> Result<()> {
        let mut ledger = self.ledger.write().await;
        let i = *ledger.index.get(transaction_id).ok_or_else(|| {
            GatewayError::StoreError(format!("unknown transaction {transaction_id}"))
        })?;
        ledger.transactions[i].status = status;
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.ledger.read().await.transactions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.ledger.read().await.transactions.is_empty()
    }
}

#[async_trait]
impl TransactionRegistrar for InMemoryTransactionRegistrar {
    async fn register(&self, new: NewTransaction) -> Result<Transaction> {
        let tx = Transaction {
            transaction_id: Uuid::new_v4().to_string(),
            order_type: new.order_type,
            order_id: new.order_id,
            provider: new.provider,
            parent_id: None,
            subscription: new.subscription,
            amount: new.amount,
            currency: new.currency,
            status: TransactionStatus::Pending,
            options: new.options,
        };
        let mut ledger = self.ledger.write().await;
        let position = ledger.transactions.len();
        ledger.index.insert(tx.transaction_id.clone(), position);
        ledger.transactions.push(tx.clone());
        Ok(tx)
    }

    /// The most recently registered subscription root wins; earlier ones are
    /// abandoned checkout attempts.
    async fn find_root(
        &self,
        order_type: &str,
        order_id: &str,
        provider: &str,
    ) -> Result<Option<Transaction>> {
        let ledger = self.ledger.read().await;
        Ok(ledger
            .transactions
            .iter()
            .rev()
            .find(|tx| {
                tx.is_root()
                    && tx.subscription
                    && tx.order_type == order_type
                    && tx.order_id == order_id
                    && tx.provider == provider
            })
            .cloned())
    }
}

/// An in-memory transaction manager that records invoices.
///
/// Redelivered invoices are ignored by `(payment_id, status)`. When a registrar
/// is attached, the correlated transaction's status follows the invoices.
#[derive(Default, Clone)]
pub struct InMemoryTransactionManager {
    invoices: Arc<RwLock<Vec<Invoice>>>,
    seen: Arc<RwLock<HashSet<(String, InvoiceStatus)>>>,
    registrar: Option<InMemoryTransactionRegistrar>,
}

impl InMemoryTransactionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registrar(registrar: InMemoryTransactionRegistrar) -> Self {
        Self {
            registrar: Some(registrar),
            ..Self::default()
        }
    }

    pub async fn invoices(&self) -> Vec<Invoice> {
        self.invoices.read().await.clone()
    }

    /// Takes the recorded invoices in arrival order, leaving the manager empty.
    pub async fn into_invoices(self) -> Vec<Invoice> {
        std::mem::take(&mut *self.invoices.write().await)
    }
}

fn transaction_status(invoice: &Invoice) -> TransactionStatus {
    match (invoice.kind, invoice.status) {
        (_, InvoiceStatus::Failure) => TransactionStatus::Failure,
        (_, InvoiceStatus::Canceled) => TransactionStatus::Canceled,
        (TransactionType::Refund, _) | (_, InvoiceStatus::Refund) => TransactionStatus::Refund,
        (_, InvoiceStatus::Successful) => TransactionStatus::Successful,
    }
}

#[async_trait]
impl TransactionManager for InMemoryTransactionManager {
    async fn process(&self, invoice: Invoice) -> Result<()> {
        if !self.seen.write().await.insert(invoice.idempotency_key()) {
            return Ok(());
        }
        if let Some(registrar) = &self.registrar
            && registrar.get(&invoice.order_id).await.is_some()
        {
            registrar
                .set_status(&invoice.order_id, transaction_status(&invoice))
                .await?;
        }
        self.invoices.write().await.push(invoice);
        Ok(())
    }
}
