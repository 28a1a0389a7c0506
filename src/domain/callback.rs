use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

/// Decoded contents of a gateway notification.
///
/// Only the fields the status mapper reads are modelled; the gateway sends
/// many more and they are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CallbackPayload {
    pub version: u32,
    pub public_key: String,
    pub action: String,
    pub status: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub payment_id: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub order_id: String,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub refund_amount: Option<Decimal>,
    #[serde(default)]
    pub receiver_commission: Option<Decimal>,
}

impl CallbackPayload {
    pub fn is_subscription(&self) -> bool {
        self.action == "subscribe"
    }

    pub fn is_reversal(&self) -> bool {
        self.status == "reversed"
    }
}

/// The gateway sends numeric ids for payments and echoes ours back as strings.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}
