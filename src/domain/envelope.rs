//! Signed payload codec shared by outbound requests and inbound callbacks.
//!
//! A field map is serialized to JSON, base64-encoded into `data`, and signed as
//! `base64(sha1(private_key + data + private_key))`. The gateway computes the
//! same digest on its side, so the concatenation order and the digest are part
//! of the wire contract.

use crate::error::{GatewayError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use ring::digest;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Ordered key/value map sent to the gateway.
pub type Fields = Map<String, Value>;

/// The unit exchanged with the gateway: base64 JSON payload plus its signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedEnvelope {
    pub data: String,
    pub signature: String,
}

impl SignedEnvelope {
    /// Form parameters in the order the gateway documents them.
    pub fn form_params(&self) -> [(&'static str, &str); 2] {
        [("data", &self.data), ("signature", &self.signature)]
    }
}

/// Computes the signature of an already encoded `data` blob.
pub fn sign(private_key: &str, data: &str) -> String {
    let mut ctx = digest::Context::new(&digest::SHA1_FOR_LEGACY_USE_ONLY);
    ctx.update(private_key.as_bytes());
    ctx.update(data.as_bytes());
    ctx.update(private_key.as_bytes());
    BASE64.encode(ctx.finish().as_ref())
}

/// Checks `signature` against the one `private_key` produces for `data`.
pub fn verify(data: &str, signature: &str, private_key: &str) -> bool {
    sign(private_key, data).as_bytes() == signature.as_bytes()
}

/// Encodes and signs with one merchant's private key.
#[derive(Clone)]
pub struct PayloadCodec {
    private_key: String,
}

impl PayloadCodec {
    pub fn new(private_key: impl Into<String>) -> Self {
        Self {
            private_key: private_key.into(),
        }
    }

    /// Serializes `fields` in insertion order and signs the result.
    pub fn encode(&self, fields: &Fields) -> Result<SignedEnvelope> {
        let json = serde_json::to_string(fields)?;
        let data = BASE64.encode(json);
        let signature = self.sign(&data);
        Ok(SignedEnvelope { data, signature })
    }

    pub fn sign(&self, data: &str) -> String {
        sign(&self.private_key, data)
    }

    pub fn verify(&self, data: &str, signature: &str) -> bool {
        verify(data, signature, &self.private_key)
    }

    /// Decodes a `data` blob into `T` without looking at the signature.
    pub fn decode<T: DeserializeOwned>(data: &str) -> Result<T> {
        let bytes = BASE64
            .decode(data.trim())
            .map_err(|e| GatewayError::MalformedCallback(format!("data is not base64: {e}")))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| GatewayError::MalformedCallback(format!("data is not valid JSON: {e}")))
    }
}

impl fmt::Debug for PayloadCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadCodec")
            .field("private_key", &"<redacted>")
            .finish()
    }
}
