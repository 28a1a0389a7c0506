use super::envelope::{Fields, SignedEnvelope};
use crate::error::{GatewayError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// API version spoken in both directions.
pub const API_VERSION: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Pay,
    Subscribe,
    Unsubscribe,
}

/// Subscription fields, present only when `action` is `subscribe`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscribeFields {
    pub subscribe: String,
    /// UTC, `YYYY-MM-DD HH:MM:SS`.
    pub subscribe_date_start: String,
    pub subscribe_periodicity: String,
}

/// Field set of a checkout request, serialized in declaration order.
///
/// Optional attributes that are unknown are left out of the payload rather
/// than sent empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRequest {
    pub version: u32,
    pub public_key: String,
    pub server_url: String,
    pub action: Action,
    pub currency: String,
    pub amount: Decimal,
    pub description: String,
    #[serde(flatten)]
    pub subscription: Option<SubscribeFields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paytypes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(flatten)]
    pub sender: Fields,
    #[serde(flatten)]
    pub product: Fields,
    pub result_url: String,
    pub order_id: String,
}

impl PaymentRequest {
    pub fn to_fields(&self) -> Result<Fields> {
        into_fields(serde_json::to_value(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnsubscribeRequest {
    pub version: u32,
    pub public_key: String,
    pub action: Action,
    pub order_id: String,
}

impl UnsubscribeRequest {
    pub fn to_fields(&self) -> Result<Fields> {
        into_fields(serde_json::to_value(self)?)
    }
}

fn into_fields(value: Value) -> Result<Fields> {
    match value {
        Value::Object(fields) => Ok(fields),
        other => Err(GatewayError::JsonError(serde::ser::Error::custom(format!(
            "expected a JSON object, got {other}"
        )))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Post,
}

/// What the host should do with the customer: submit `envelope` to `url`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutAction {
    pub provider: String,
    pub url: String,
    pub method: HttpMethod,
    #[serde(flatten)]
    pub envelope: SignedEnvelope,
}
