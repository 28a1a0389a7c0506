use crate::PROVIDER_NAME;
use crate::config::LiqPayConfig;
use crate::domain::envelope::{Fields, PayloadCodec};
use crate::domain::order::Order;
use crate::domain::ports::{SharedHttpTransport, SharedTransactionRegistrar};
use crate::domain::request::{API_VERSION, Action, UnsubscribeRequest};
use crate::domain::transaction::TransactionStatus;
use crate::error::{GatewayError, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

const REQUEST_PATH: &str = "request";

/// Signed server-to-server calls to the gateway API.
pub struct ApiClient {
    config: Arc<LiqPayConfig>,
    codec: PayloadCodec,
    transport: SharedHttpTransport,
    registrar: SharedTransactionRegistrar,
}

impl ApiClient {
    pub fn new(
        config: Arc<LiqPayConfig>,
        transport: SharedHttpTransport,
        registrar: SharedTransactionRegistrar,
    ) -> Self {
        let codec = PayloadCodec::new(config.private_key.clone());
        Self {
            config,
            codec,
            transport,
            registrar,
        }
    }

    /// POSTs `params` as a signed envelope to `<api_url><path>` and parses the JSON reply.
    pub async fn api(&self, path: &str, params: &Fields) -> Result<Value> {
        let envelope = self.codec.encode(params)?;
        let url = self.config.endpoint(path);
        debug!(%url, "calling gateway api");
        let body = self
            .transport
            .post_form(&url, &envelope.form_params())
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Cancels the subscription behind `order`.
    ///
    /// An already cancelled root transaction short-circuits to `true` without
    /// calling the gateway.
    pub async fn unsubscribe(&self, order: &dyn Order) -> Result<bool> {
        let root = self
            .registrar
            .find_root(order.order_type(), order.order_key(), PROVIDER_NAME)
            .await?
            .ok_or_else(|| GatewayError::TransactionNotFound {
                order_type: order.order_type().to_string(),
                order_id: order.order_key().to_string(),
            })?;

        if root.status == TransactionStatus::Canceled {
            debug!(transaction_id = %root.transaction_id, "subscription already cancelled");
            return Ok(true);
        }

        let request = UnsubscribeRequest {
            version: API_VERSION,
            public_key: self.config.public_key.clone(),
            action: Action::Unsubscribe,
            order_id: root.transaction_id.clone(),
        };
        let response = self.api(REQUEST_PATH, &request.to_fields()?).await?;
        let unsubscribed = response.get("status").and_then(Value::as_str) == Some("unsubscribed");
        info!(
            transaction_id = %root.transaction_id,
            unsubscribed,
            "unsubscribe requested"
        );
        Ok(unsubscribed)
    }
}
