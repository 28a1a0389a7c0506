pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;

/// Name the host's provider registry routes LiqPay traffic by.
pub const PROVIDER_NAME: &str = "liqpay";
