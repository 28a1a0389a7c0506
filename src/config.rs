use crate::domain::status::StatusTable;
use crate::error::{GatewayError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_API_URL: &str = "https://www.liqpay.ua/api/";
pub const DEFAULT_CURRENCY: &str = "UAH";

/// Currencies offered to merchants, with display labels.
pub const CURRENCIES: &[(&str, &str)] = &[("UAH", "Hryvnia"), ("EUR", "Euro"), ("USD", "Dollar")];

/// Payment methods the checkout page can be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayType {
    Card,
    Privat24,
    Liqpay,
    Invoice,
    Cash,
}

impl PayType {
    pub const ALL: [PayType; 5] = [
        PayType::Card,
        PayType::Privat24,
        PayType::Liqpay,
        PayType::Invoice,
        PayType::Cash,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PayType::Card => "card",
            PayType::Privat24 => "privat24",
            PayType::Liqpay => "liqpay",
            PayType::Invoice => "invoice",
            PayType::Cash => "cash",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PayType::Card => "Card",
            PayType::Privat24 => "Privat24",
            PayType::Liqpay => "LiqPay",
            PayType::Invoice => "Invoice",
            PayType::Cash => "Cash",
        }
    }
}

impl FromStr for PayType {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        PayType::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| GatewayError::ConfigError(format!("unknown paytype '{s}'")))
    }
}

/// Merchant settings for one LiqPay shop.
#[derive(Clone, Deserialize)]
pub struct LiqPayConfig {
    pub public_key: String,
    pub private_key: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default, deserialize_with = "deserialize_paytypes")]
    pub paytypes: Vec<PayType>,
    #[serde(default)]
    pub sandbox: bool,
    /// Where the gateway posts callbacks.
    pub server_url: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Overrides layered over the built-in status table.
    #[serde(default = "StatusTable::empty")]
    pub statuses: StatusTable,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

/// Accepts either `"card,privat24"` or `["card", "privat24"]`.
fn deserialize_paytypes<'de, D>(deserializer: D) -> std::result::Result<Vec<PayType>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Joined(String),
        List(Vec<PayType>),
    }

    match Raw::deserialize(deserializer)? {
        Raw::List(list) => Ok(list),
        Raw::Joined(joined) => joined
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<PayType>()
                    .map_err(<D::Error as serde::de::Error>::custom)
            })
            .collect(),
    }
}

impl LiqPayConfig {
    pub fn new(
        public_key: impl Into<String>,
        private_key: impl Into<String>,
        server_url: impl Into<String>,
    ) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: private_key.into(),
            currency: default_currency(),
            paytypes: Vec::new(),
            sandbox: false,
            server_url: server_url.into(),
            api_url: default_api_url(),
            statuses: StatusTable::empty(),
        }
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| GatewayError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a TOML file, then applies `LIQPAY_*` environment overrides.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&source).map_err(|e| GatewayError::ConfigError(e.to_string()))?;
        let config = config.with_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `LIQPAY_PUBLIC_KEY`, `LIQPAY_PRIVATE_KEY`, `LIQPAY_SANDBOX` and
    /// `LIQPAY_API_URL` from `lookup`. Empty values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = get("LIQPAY_PUBLIC_KEY") {
            self.public_key = v;
        }
        if let Some(v) = get("LIQPAY_PRIVATE_KEY") {
            self.private_key = v;
        }
        if let Some(v) = get("LIQPAY_API_URL") {
            self.api_url = v;
        }
        if let Some(v) = get("LIQPAY_SANDBOX") {
            self.sandbox = match v.to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                other => {
                    return Err(GatewayError::ConfigError(format!(
                        "LIQPAY_SANDBOX must be a boolean, got '{other}'"
                    )));
                }
            };
        }
        Ok(self)
    }

    /// Both keys are present.
    pub fn is_valid(&self) -> bool {
        !self.public_key.is_empty() && !self.private_key.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if !self.is_valid() {
            return Err(GatewayError::ConfigError(
                "public_key and private_key are required".to_string(),
            ));
        }
        if self.server_url.is_empty() {
            return Err(GatewayError::ConfigError("server_url is required".to_string()));
        }
        url::Url::parse(&self.api_url)
            .map_err(|e| GatewayError::ConfigError(format!("api_url: {e}")))?;
        if !self.api_url.ends_with('/') {
            return Err(GatewayError::ConfigError(
                "api_url must end with '/'".to_string(),
            ));
        }
        Ok(())
    }

    /// The `paytypes` request value, absent when unrestricted.
    pub fn paytypes_param(&self) -> Option<String> {
        if self.paytypes.is_empty() {
            return None;
        }
        let joined: Vec<&str> = self.paytypes.iter().map(|p| p.as_str()).collect();
        Some(joined.join(","))
    }

    /// The effective status table: built-in mapping plus configured overrides.
    pub fn status_table(&self) -> StatusTable {
        StatusTable::default().merged(&self.statuses)
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path.trim_start_matches('/'))
    }

    pub fn checkout_url(&self) -> String {
        self.endpoint("3/checkout")
    }
}

impl fmt::Debug for LiqPayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiqPayConfig")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .field("currency", &self.currency)
            .field("paytypes", &self.paytypes)
            .field("sandbox", &self.sandbox)
            .field("server_url", &self.server_url)
            .field("api_url", &self.api_url)
            .field("statuses", &self.statuses)
            .finish()
    }
}
