//! Host-side webhook endpoint policy.
//!
//! The gateway treats anything but a 2xx as a failed delivery and retries, so
//! every callback is answered with `200 OK`. The outcome is still reported to
//! the host. Rejections are logged at `error` by the callback handler itself;
//! malformed bodies and downstream failures are logged here at `warn`.
//!
//! Deliveries arrive URL-encoded or as `multipart/form-data`; hosts that parse
//! the form themselves hand over the two fields directly.

use crate::application::provider::LiqPayProvider;
use crate::error::{GatewayError, Result};
use multer::Multipart;
use tracing::warn;

#[derive(Debug)]
pub enum WebhookOutcome {
    /// Invoices forwarded to the transaction manager; zero for an unknown status.
    Processed(usize),
    /// Signature, version or public key check failed.
    Rejected(GatewayError),
    /// Anything else: unreadable body, manager failure.
    Failed(GatewayError),
}

#[derive(Debug)]
pub struct WebhookResponse {
    pub status: u16,
    pub body: &'static str,
    pub outcome: WebhookOutcome,
}

impl WebhookResponse {
    fn ok(outcome: WebhookOutcome) -> Self {
        Self {
            status: 200,
            body: "",
            outcome,
        }
    }
}

/// Runs one URL-encoded callback body through `provider` and acknowledges it.
pub async fn receive(provider: &LiqPayProvider, raw_form_body: &[u8]) -> WebhookResponse {
    acknowledge(provider, provider.callback(raw_form_body).await)
}

/// Same as [`receive`] for a form the host has already parsed.
pub async fn receive_envelope(
    provider: &LiqPayProvider,
    data: &str,
    signature: &str,
) -> WebhookResponse {
    acknowledge(provider, provider.callback_envelope(data, signature).await)
}

/// Same as [`receive`] for a `multipart/form-data` body.
pub async fn receive_multipart(
    provider: &LiqPayProvider,
    content_type: &str,
    body: &[u8],
) -> WebhookResponse {
    let result = match multipart_envelope(content_type, body).await {
        Ok((data, signature)) => provider.callback_envelope(&data, &signature).await,
        Err(e) => Err(e),
    };
    acknowledge(provider, result)
}

/// Dispatches on the request's `Content-Type`; anything not multipart is
/// treated as URL-encoded.
pub async fn receive_with_content_type(
    provider: &LiqPayProvider,
    content_type: Option<&str>,
    body: &[u8],
) -> WebhookResponse {
    match content_type {
        Some(ct) if ct.trim_start().starts_with("multipart/form-data") => {
            receive_multipart(provider, ct, body).await
        }
        _ => receive(provider, body).await,
    }
}

async fn multipart_envelope(content_type: &str, body: &[u8]) -> Result<(String, String)> {
    let malformed = |e: multer::Error| GatewayError::MalformedCallback(e.to_string());
    let boundary = multer::parse_boundary(content_type).map_err(malformed)?;
    let mut multipart = Multipart::with_reader(body, boundary);

    let mut data = None;
    let mut signature = None;
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("data") => data = Some(field.text().await.map_err(malformed)?),
            Some("signature") => signature = Some(field.text().await.map_err(malformed)?),
            _ => {}
        }
    }
    let data = data.ok_or_else(|| GatewayError::MalformedCallback("missing data".into()))?;
    let signature =
        signature.ok_or_else(|| GatewayError::MalformedCallback("missing signature".into()))?;
    Ok((data, signature))
}

fn acknowledge(provider: &LiqPayProvider, result: Result<usize>) -> WebhookResponse {
    match result {
        Ok(count) => WebhookResponse::ok(WebhookOutcome::Processed(count)),
        Err(e) if e.is_rejection() => WebhookResponse::ok(WebhookOutcome::Rejected(e)),
        Err(e) => {
            warn!(provider = provider.name(), error = %e, "webhook not processed");
            WebhookResponse::ok(WebhookOutcome::Failed(e))
        }
    }
}
