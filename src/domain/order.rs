use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Recurrence unit of a subscription as the host application models it.
///
/// The host vocabulary is wider than what the gateway accepts; only `Month`
/// and `Year` survive request building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Periodicity {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Periodicity {
    /// The gateway's `subscribe_periodicity` value, if it has one.
    pub fn wire_name(self) -> Option<&'static str> {
        match self {
            Periodicity::Month => Some("month"),
            Periodicity::Year => Some("year"),
            _ => None,
        }
    }
}

impl fmt::Display for Periodicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Periodicity::Day => "day",
            Periodicity::Week => "week",
            Periodicity::Month => "month",
            Periodicity::Quarter => "quarter",
            Periodicity::Year => "year",
        };
        f.write_str(name)
    }
}

/// Recurring billing terms attached to a payment.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub start: DateTime<FixedOffset>,
    pub periodicity: Periodicity,
}

/// Customer identity and address, as exposed by the host.
///
/// An empty string means "not known" and suppresses the field.
pub trait Client: Send + Sync {
    fn id(&self) -> &str;
    fn first_name(&self) -> &str;
    fn last_name(&self) -> &str;
    fn city(&self) -> &str;
    fn address(&self) -> &str;
    fn postal_code(&self) -> &str;
}

/// Product metadata, as exposed by the host.
pub trait Product: Send + Sync {
    fn url(&self) -> &str;
    fn category(&self) -> &str;
    fn name(&self) -> &str;
    fn description(&self) -> &str;
}

pub type ClientAccessor = fn(&dyn Client) -> &str;
pub type ProductAccessor = fn(&dyn Product) -> &str;

/// Request field name for each sender attribute.
pub const SENDER_FIELDS: &[(&str, ClientAccessor)] = &[
    ("sender_first_name", |c| c.first_name()),
    ("sender_last_name", |c| c.last_name()),
    ("sender_city", |c| c.city()),
    ("sender_address", |c| c.address()),
    ("sender_postal_code", |c| c.postal_code()),
];

/// Request field name for each product attribute.
pub const PRODUCT_FIELDS: &[(&str, ProductAccessor)] = &[
    ("product_url", |p| p.url()),
    ("product_category", |p| p.category()),
    ("product_name", |p| p.name()),
    ("product_description", |p| p.description()),
];

/// The payment aggregate of an order.
#[derive(Clone)]
pub struct Payment {
    pub amount: Decimal,
    /// Falls back to the configured currency when absent.
    pub currency: Option<String>,
    pub description: String,
    pub return_url: String,
    pub subscription: Option<Subscription>,
    pub client: Option<Arc<dyn Client>>,
    pub product: Option<Arc<dyn Product>>,
}

impl Payment {
    pub fn new(amount: Decimal, description: impl Into<String>, return_url: impl Into<String>) -> Self {
        Self {
            amount,
            currency: None,
            description: description.into(),
            return_url: return_url.into(),
            subscription: None,
            client: None,
            product: None,
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn with_subscription(mut self, subscription: Subscription) -> Self {
        self.subscription = Some(subscription);
        self
    }

    pub fn with_client(mut self, client: Arc<dyn Client>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_product(mut self, product: Arc<dyn Product>) -> Self {
        self.product = Some(product);
        self
    }

    pub fn is_subscription(&self) -> bool {
        self.subscription.is_some()
    }
}

impl fmt::Debug for Payment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payment")
            .field("amount", &self.amount)
            .field("currency", &self.currency)
            .field("description", &self.description)
            .field("return_url", &self.return_url)
            .field("subscription", &self.subscription)
            .field("client", &self.client.as_ref().map(|c| c.id().to_string()))
            .field("product", &self.product.as_ref().map(|p| p.name().to_string()))
            .finish()
    }
}

/// Anything the host can take payment for.
///
/// `order_type` and `order_key` identify the order in the host's storage and
/// key its local transactions.
pub trait Order: Send + Sync {
    fn order_type(&self) -> &str;
    fn order_key(&self) -> &str;
    fn payment(&self) -> &Payment;
}

/// Plain-data `Client` for hosts that have nothing richer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientProfile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub city: String,
    pub address: String,
    pub postal_code: String,
}

impl Client for ClientProfile {
    fn id(&self) -> &str {
        &self.id
    }
    fn first_name(&self) -> &str {
        &self.first_name
    }
    fn last_name(&self) -> &str {
        &self.last_name
    }
    fn city(&self) -> &str {
        &self.city
    }
    fn address(&self) -> &str {
        &self.address
    }
    fn postal_code(&self) -> &str {
        &self.postal_code
    }
}

/// Plain-data `Product`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProductInfo {
    pub url: String,
    pub category: String,
    pub name: String,
    pub description: String,
}

impl Product for ProductInfo {
    fn url(&self) -> &str {
        &self.url
    }
    fn category(&self) -> &str {
        &self.category
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn description(&self) -> &str {
        &self.description
    }
}
