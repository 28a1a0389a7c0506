use crate::config::LiqPayConfig;
use crate::domain::envelope::{Fields, PayloadCodec};
use crate::domain::order::{Order, PRODUCT_FIELDS, Payment, Periodicity, SENDER_FIELDS};
use crate::domain::ports::{SharedPaymentParamsObserver, SharedTransactionRegistrar};
use crate::domain::request::{
    API_VERSION, Action, CheckoutAction, HttpMethod, PaymentRequest, SubscribeFields,
};
use crate::domain::transaction::NewTransaction;
use crate::error::{GatewayError, Result};
use crate::PROVIDER_NAME;
use chrono::Utc;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Extra attributes passed through to the registered transaction.
pub type PaymentOptions = BTreeMap<String, String>;

const SUBSCRIBE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Turns an order into a signed checkout action.
///
/// Validation happens before anything is registered, so a rejected order
/// leaves no transaction behind.
pub struct RequestBuilder {
    config: Arc<LiqPayConfig>,
    codec: PayloadCodec,
    registrar: SharedTransactionRegistrar,
    observer: Option<SharedPaymentParamsObserver>,
}

impl RequestBuilder {
    pub fn new(config: Arc<LiqPayConfig>, registrar: SharedTransactionRegistrar) -> Self {
        let codec = PayloadCodec::new(config.private_key.clone());
        Self {
            config,
            codec,
            registrar,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: SharedPaymentParamsObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Builds the field set without a correlation id; `order_id` is left empty.
    pub fn prepare(
        &self,
        payment: &Payment,
        periodicity_override: Option<Periodicity>,
    ) -> Result<PaymentRequest> {
        let subscription = match &payment.subscription {
            Some(terms) => {
                let periodicity = periodicity_override.unwrap_or(terms.periodicity);
                let wire = periodicity
                    .wire_name()
                    .ok_or(GatewayError::UnsupportedPeriodicity(periodicity))?;
                Some(SubscribeFields {
                    subscribe: "1".to_string(),
                    subscribe_date_start: terms
                        .start
                        .with_timezone(&Utc)
                        .format(SUBSCRIBE_DATE_FORMAT)
                        .to_string(),
                    subscribe_periodicity: wire.to_string(),
                })
            }
            None => None,
        };

        let mut sender = Fields::new();
        let mut customer = None;
        if let Some(client) = &payment.client {
            if !client.id().is_empty() {
                customer = Some(client.id().to_string());
            }
            for (field, get) in SENDER_FIELDS {
                put_non_empty(&mut sender, field, get(client.as_ref()));
            }
        }

        let mut product = Fields::new();
        if let Some(item) = &payment.product {
            for (field, get) in PRODUCT_FIELDS {
                put_non_empty(&mut product, field, get(item.as_ref()));
            }
        }

        Ok(PaymentRequest {
            version: API_VERSION,
            public_key: self.config.public_key.clone(),
            server_url: self.config.server_url.clone(),
            action: if subscription.is_some() {
                Action::Subscribe
            } else {
                Action::Pay
            },
            currency: payment
                .currency
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| self.config.currency.clone()),
            amount: payment.amount,
            description: payment.description.clone(),
            subscription,
            paytypes: self.config.paytypes_param(),
            sandbox: self.config.sandbox.then_some(1),
            customer,
            sender,
            product,
            result_url: payment.return_url.clone(),
            order_id: String::new(),
        })
    }

    /// Registers a transaction for `order` and returns the signed checkout action.
    pub async fn build(
        &self,
        order: &dyn Order,
        options: &PaymentOptions,
        periodicity_override: Option<Periodicity>,
    ) -> Result<CheckoutAction> {
        let payment = order.payment();
        let mut request = self.prepare(payment, periodicity_override)?;

        let transaction = self
            .registrar
            .register(NewTransaction {
                order_type: order.order_type().to_string(),
                order_id: order.order_key().to_string(),
                provider: PROVIDER_NAME.to_string(),
                subscription: payment.is_subscription(),
                amount: payment.amount,
                currency: request.currency.clone(),
                options: options.clone(),
            })
            .await?;
        request.order_id = transaction.transaction_id;

        let mut fields = request.to_fields()?;
        if let Some(observer) = &self.observer {
            observer.on_params(&mut fields, order);
        }
        debug!(?fields, "checkout fields assembled");

        let envelope = self.codec.encode(&fields)?;
        info!(
            order_type = order.order_type(),
            order_id = order.order_key(),
            correlation_id = %request.order_id,
            action = ?request.action,
            "checkout action built"
        );

        Ok(CheckoutAction {
            provider: PROVIDER_NAME.to_string(),
            url: self.config.checkout_url(),
            method: HttpMethod::Post,
            envelope,
        })
    }
}

fn put_non_empty(fields: &mut Fields, key: &str, value: &str) {
    if !value.is_empty() {
        fields.insert(key.to_string(), Value::String(value.to_string()));
    }
}
