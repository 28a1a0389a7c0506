use crate::application::request_builder::PaymentOptions;
use crate::domain::order::{ClientProfile, Order, Payment, Periodicity, ProductInfo, Subscription};
use crate::error::Result;
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Deserialize)]
struct SubscriptionDocument {
    start: DateTime<FixedOffset>,
    periodicity: Periodicity,
}

#[derive(Debug, Clone, Deserialize)]
struct OrderDocumentRaw {
    #[serde(default = "default_order_type")]
    order_type: String,
    order_id: String,
    amount: Decimal,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    return_url: String,
    #[serde(default)]
    subscription: Option<SubscriptionDocument>,
    #[serde(default)]
    client: Option<ClientProfile>,
    #[serde(default)]
    product: Option<ProductInfo>,
    #[serde(default)]
    options: PaymentOptions,
}

fn default_order_type() -> String {
    "order".to_string()
}

/// An order described in a JSON file, for driving checkouts from the command line.
#[derive(Debug, Clone)]
pub struct OrderDocument {
    order_type: String,
    order_id: String,
    payment: Payment,
    options: PaymentOptions,
}

impl OrderDocument {
    pub fn from_json(source: &str) -> Result<Self> {
        let raw: OrderDocumentRaw = serde_json::from_str(source)?;
        let mut payment = Payment::new(raw.amount, raw.description, raw.return_url);
        payment.currency = raw.currency;
        if let Some(sub) = raw.subscription {
            payment = payment.with_subscription(Subscription {
                start: sub.start,
                periodicity: sub.periodicity,
            });
        }
        if let Some(client) = raw.client {
            payment = payment.with_client(Arc::new(client));
        }
        if let Some(product) = raw.product {
            payment = payment.with_product(Arc::new(product));
        }
        Ok(Self {
            order_type: raw.order_type,
            order_id: raw.order_id,
            payment,
            options: raw.options,
        })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn options(&self) -> &PaymentOptions {
        &self.options
    }
}

impl Order for OrderDocument {
    fn order_type(&self) -> &str {
        &self.order_type
    }

    fn order_key(&self) -> &str {
        &self.order_id
    }

    fn payment(&self) -> &Payment {
        &self.payment
    }
}
