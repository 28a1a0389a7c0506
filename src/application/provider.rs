use super::api_client::ApiClient;
use super::callback::CallbackHandler;
use super::request_builder::{PaymentOptions, RequestBuilder};
use crate::PROVIDER_NAME;
use crate::config::LiqPayConfig;
use crate::domain::envelope::Fields;
use crate::domain::invoice::Invoice;
use crate::domain::order::{Order, Periodicity};
use crate::domain::ports::{
    SharedHttpTransport, SharedPaymentParamsObserver, SharedTransactionManager,
    SharedTransactionRegistrar,
};
use crate::domain::request::CheckoutAction;
use crate::error::Result;
use serde_json::Value;
use std::sync::Arc;

/// Collaborators the host supplies to every provider instance.
#[derive(Clone)]
pub struct ProviderDeps {
    pub registrar: SharedTransactionRegistrar,
    pub manager: SharedTransactionManager,
    pub transport: SharedHttpTransport,
    pub observer: Option<SharedPaymentParamsObserver>,
}

/// The LiqPay implementation of the host's payment provider contract.
pub struct LiqPayProvider {
    config: Arc<LiqPayConfig>,
    builder: RequestBuilder,
    callbacks: CallbackHandler,
    api: ApiClient,
    manager: SharedTransactionManager,
}

impl LiqPayProvider {
    pub fn new(config: LiqPayConfig, deps: ProviderDeps) -> Self {
        let config = Arc::new(config);
        let mut builder = RequestBuilder::new(config.clone(), deps.registrar.clone());
        if let Some(observer) = deps.observer {
            builder = builder.with_observer(observer);
        }
        let callbacks = CallbackHandler::new(
            config.public_key.clone(),
            config.private_key.clone(),
            config.status_table(),
        );
        let api = ApiClient::new(config.clone(), deps.transport, deps.registrar);
        Self {
            config,
            builder,
            callbacks,
            api,
            manager: deps.manager,
        }
    }

    pub fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    pub fn config(&self) -> &LiqPayConfig {
        &self.config
    }

    pub fn is_valid(&self) -> bool {
        self.config.is_valid()
    }

    pub fn callbacks(&self) -> &CallbackHandler {
        &self.callbacks
    }

    pub async fn create_payment(
        &self,
        order: &dyn Order,
        options: &PaymentOptions,
        periodicity_override: Option<Periodicity>,
    ) -> Result<CheckoutAction> {
        self.builder
            .build(order, options, periodicity_override)
            .await
    }

    /// Authenticates a callback body and forwards its invoices to the manager.
    ///
    /// Returns how many invoices were forwarded; zero for an unknown status.
    pub async fn callback(&self, raw_form_body: &[u8]) -> Result<usize> {
        let invoices = self.callbacks.handle(raw_form_body)?;
        self.forward(invoices).await
    }

    /// Same as [`LiqPayProvider::callback`] for already extracted fields.
    pub async fn callback_envelope(&self, data: &str, signature: &str) -> Result<usize> {
        let invoices = self.callbacks.handle_envelope(data, signature)?;
        self.forward(invoices).await
    }

    async fn forward(&self, invoices: Vec<Invoice>) -> Result<usize> {
        let count = invoices.len();
        for invoice in invoices {
            self.manager.process(invoice).await?;
        }
        Ok(count)
    }

    pub async fn unsubscribe(&self, order: &dyn Order) -> Result<bool> {
        self.api.unsubscribe(order).await
    }

    pub async fn api(&self, path: &str, params: &Fields) -> Result<Value> {
        self.api.api(path, params).await
    }
}

pub type ProviderFactory = Box<dyn Fn(LiqPayConfig) -> LiqPayProvider + Send + Sync>;

/// The host's name-keyed provider registry.
pub trait ProviderRegistry {
    fn extend(&mut self, name: &'static str, factory: ProviderFactory);
}

/// Makes LiqPay available to the host under [`PROVIDER_NAME`].
pub fn register<R: ProviderRegistry + ?Sized>(registry: &mut R, deps: ProviderDeps) {
    registry.extend(
        PROVIDER_NAME,
        Box::new(move |config| LiqPayProvider::new(config, deps.clone())),
    );
}
