//! Application layer: the three flows the gateway contract defines.
//!
//! [`request_builder`] turns host orders into signed checkout actions,
//! [`callback`] authenticates gateway notifications and maps them to invoices,
//! and [`api_client`] performs signed server-to-server calls. [`provider`]
//! bundles them behind the host's provider contract.

pub mod api_client;
pub mod callback;
pub mod provider;
pub mod request_builder;
