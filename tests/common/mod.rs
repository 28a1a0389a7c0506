#![allow(dead_code)]

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use liqpay_gateway::application::provider::{LiqPayProvider, ProviderDeps};
use liqpay_gateway::config::LiqPayConfig;
use liqpay_gateway::domain::envelope::sign;
use liqpay_gateway::domain::order::{Order, Payment};
use liqpay_gateway::domain::ports::HttpTransport;
use liqpay_gateway::error::{GatewayError, Result};
use liqpay_gateway::infrastructure::in_memory::{
    InMemoryTransactionManager, InMemoryTransactionRegistrar,
};
use serde_json::Value;
use std::io;
use std::sync::{Arc, Mutex};
use tracing::subscriber::DefaultGuard;

pub const PUBLIC_KEY: &str = "pk";
pub const PRIVATE_KEY: &str = "sk";

pub fn config() -> LiqPayConfig {
    LiqPayConfig::new(PUBLIC_KEY, PRIVATE_KEY, "https://shop.test/payments/liqpay")
}

pub struct TestOrder {
    pub key: String,
    pub payment: Payment,
}

impl TestOrder {
    pub fn new(key: &str, payment: Payment) -> Self {
        Self {
            key: key.to_string(),
            payment,
        }
    }
}

impl Order for TestOrder {
    fn order_type(&self) -> &str {
        "shop_order"
    }

    fn order_key(&self) -> &str {
        &self.key
    }

    fn payment(&self) -> &Payment {
        &self.payment
    }
}

/// Records every request and answers with a canned body.
pub struct FakeTransport {
    pub requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
    response: std::result::Result<String, String>,
}

impl FakeTransport {
    pub fn responding(body: &str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            response: Ok(body.to_string()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            response: Err(message.to_string()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<String> {
        self.requests.lock().unwrap().push((
            url.to_string(),
            form.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ));
        self.response
            .clone()
            .map_err(|e| GatewayError::TransportError(e.into()))
    }
}

pub struct Harness {
    pub provider: LiqPayProvider,
    pub registrar: InMemoryTransactionRegistrar,
    pub manager: InMemoryTransactionManager,
    pub transport: Arc<FakeTransport>,
}

pub fn harness(transport: FakeTransport) -> Harness {
    harness_with(config(), transport)
}

pub fn harness_with(config: LiqPayConfig, transport: FakeTransport) -> Harness {
    let registrar = InMemoryTransactionRegistrar::new();
    let manager = InMemoryTransactionManager::with_registrar(registrar.clone());
    let transport = Arc::new(transport);
    let provider = LiqPayProvider::new(
        config,
        ProviderDeps {
            registrar: Arc::new(registrar.clone()),
            manager: Arc::new(manager.clone()),
            transport: transport.clone(),
            observer: None,
        },
    );
    Harness {
        provider,
        registrar,
        manager,
        transport,
    }
}

/// Encodes and signs a callback payload the way the gateway does.
pub fn signed(payload: &Value, private_key: &str) -> (String, String) {
    let data = BASE64.encode(payload.to_string());
    let signature = sign(private_key, &data);
    (data, signature)
}

/// URL-encoded form body carrying a signed payload.
pub fn form_body(payload: &Value) -> Vec<u8> {
    form_body_signed_with(payload, PRIVATE_KEY)
}

pub fn form_body_signed_with(payload: &Value, private_key: &str) -> Vec<u8> {
    let (data, signature) = signed(payload, private_key);
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair("data", &data)
        .append_pair("signature", &signature)
        .finish()
        .into_bytes()
}

pub fn decode_data(data: &str) -> Value {
    serde_json::from_slice(&BASE64.decode(data).unwrap()).unwrap()
}

/// Log output collected by a thread-local subscriber.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    /// Installs a subscriber for the current thread; logs stop being
    /// captured when the guard drops.
    pub fn install() -> (Self, DefaultGuard) {
        let logs = Self::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        (logs, tracing::subscriber::set_default(subscriber))
    }

    pub fn lines_at(&self, level: &str) -> Vec<String> {
        let output = String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned();
        output
            .lines()
            .filter(|line| line.split_whitespace().nth(1) == Some(level))
            .map(str::to_string)
            .collect()
    }
}
