use crate::PROVIDER_NAME;
use crate::domain::callback::CallbackPayload;
use crate::domain::envelope::PayloadCodec;
use crate::domain::invoice::{Invoice, TransactionType};
use crate::domain::request::API_VERSION;
use crate::domain::status::StatusTable;
use crate::error::{GatewayError, Result};
use rust_decimal::Decimal;
use tracing::{error, info, warn};

/// Authenticates gateway callbacks and maps them onto invoices.
///
/// The checks run in a fixed order: signature over the raw `data`, then the
/// decoded version, then the embedded public key. Any failure yields no invoice.
#[derive(Debug, Clone)]
pub struct CallbackHandler {
    public_key: String,
    codec: PayloadCodec,
    statuses: StatusTable,
}

impl CallbackHandler {
    pub fn new(
        public_key: impl Into<String>,
        private_key: impl Into<String>,
        statuses: StatusTable,
    ) -> Self {
        Self {
            public_key: public_key.into(),
            codec: PayloadCodec::new(private_key),
            statuses,
        }
    }

    /// Handles a URL-encoded form body as posted by the gateway.
    pub fn handle(&self, raw_form_body: &[u8]) -> Result<Vec<Invoice>> {
        let mut data = None;
        let mut signature = None;
        for (key, value) in url::form_urlencoded::parse(raw_form_body) {
            match key.as_ref() {
                "data" => data = Some(value.into_owned()),
                "signature" => signature = Some(value.into_owned()),
                _ => {}
            }
        }
        let data = data.ok_or_else(|| GatewayError::MalformedCallback("missing data".into()))?;
        let signature = signature
            .ok_or_else(|| GatewayError::MalformedCallback("missing signature".into()))?;
        self.handle_envelope(&data, &signature)
    }

    /// Handles already extracted `data` and `signature` fields.
    pub fn handle_envelope(&self, data: &str, signature: &str) -> Result<Vec<Invoice>> {
        let payload = self.authenticate(data, signature).inspect_err(|e| {
            if e.is_rejection() {
                error!(error = %e, "callback rejected");
            }
        })?;
        Ok(self.interpret(&payload).into_iter().collect())
    }

    /// Verifies and decodes an envelope.
    pub fn authenticate(&self, data: &str, signature: &str) -> Result<CallbackPayload> {
        if !self.codec.verify(data, signature) {
            return Err(GatewayError::InvalidSignature);
        }
        let payload: CallbackPayload = PayloadCodec::decode(data)?;
        if payload.version != API_VERSION {
            return Err(GatewayError::InvalidVersion {
                expected: API_VERSION,
                actual: payload.version,
            });
        }
        if payload.public_key != self.public_key {
            return Err(GatewayError::InvalidPublicKey);
        }
        Ok(payload)
    }

    /// Maps an authenticated payload to at most one invoice.
    ///
    /// `subscribe` notifications describe the subscription's lifecycle, not a
    /// charge, so they carry a zero amount and never a companion payment.
    /// Reversals are refunds of `refund_amount` with no commission.
    pub fn interpret(&self, payload: &CallbackPayload) -> Option<Invoice> {
        let Some(status) = self.statuses.resolve(&payload.status) else {
            warn!(
                status = %payload.status,
                order_id = %payload.order_id,
                "unknown callback status, acknowledging without invoice"
            );
            return None;
        };

        let (kind, amount, fee) = if payload.is_subscription() {
            (TransactionType::Subscription, Decimal::ZERO, Decimal::ZERO)
        } else if payload.is_reversal() {
            (
                TransactionType::Refund,
                payload.refund_amount.unwrap_or(payload.amount),
                Decimal::ZERO,
            )
        } else {
            (
                TransactionType::Payment,
                payload.amount,
                payload.receiver_commission.unwrap_or(Decimal::ZERO),
            )
        };

        let invoice = Invoice {
            provider: PROVIDER_NAME.to_string(),
            payment_id: payload.payment_id.clone(),
            order_id: payload.order_id.clone(),
            kind,
            status,
            amount,
            fee,
        };
        info!(
            payment_id = %invoice.payment_id,
            order_id = %invoice.order_id,
            kind = ?invoice.kind,
            status = ?invoice.status,
            "invoice emitted"
        );
        Some(invoice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::invoice::InvoiceStatus;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use rust_decimal_macros::dec;
    use serde_json::{Value, json};

    fn handler() -> CallbackHandler {
        CallbackHandler::new("pk", "sk", StatusTable::default())
    }

    fn envelope(payload: Value) -> (String, String) {
        let data = BASE64.encode(payload.to_string());
        let signature = crate::domain::envelope::sign("sk", &data);
        (data, signature)
    }

    fn payment(status: &str) -> Value {
        json!({
            "version": 3,
            "public_key": "pk",
            "action": "pay",
            "status": status,
            "payment_id": 1001,
            "order_id": "tx-1",
            "amount": 10.0,
            "receiver_commission": 0.28
        })
    }

    #[test]
    fn test_success_payment() {
        let (data, signature) = envelope(payment("success"));
        let invoices = handler().handle_envelope(&data, &signature).unwrap();

        assert_eq!(invoices.len(), 1);
        let invoice = &invoices[0];
        assert_eq!(invoice.provider, "liqpay");
        assert_eq!(invoice.payment_id, "1001");
        assert_eq!(invoice.order_id, "tx-1");
        assert_eq!(invoice.kind, TransactionType::Payment);
        assert_eq!(invoice.status, InvoiceStatus::Successful);
        assert_eq!(invoice.amount, dec!(10));
        assert_eq!(invoice.fee, dec!(0.28));
    }

    #[test]
    fn test_missing_commission_defaults_to_zero() {
        let mut body = payment("failure");
        body.as_object_mut().unwrap().remove("receiver_commission");
        let (data, signature) = envelope(body);
        let invoices = handler().handle_envelope(&data, &signature).unwrap();

        assert_eq!(invoices[0].status, InvoiceStatus::Failure);
        assert_eq!(invoices[0].fee, Decimal::ZERO);
    }

    #[test]
    fn test_refund_status_keeps_payment_type() {
        let (data, signature) = envelope(payment("refund"));
        let invoices = handler().handle_envelope(&data, &signature).unwrap();

        assert_eq!(invoices[0].kind, TransactionType::Payment);
        assert_eq!(invoices[0].status, InvoiceStatus::Refund);
    }

    #[test]
    fn test_unknown_status_is_a_no_op() {
        let (data, signature) = envelope(payment("wait_secure"));
        let invoices = handler().handle_envelope(&data, &signature).unwrap();
        assert!(invoices.is_empty());
    }

    #[test]
    fn test_signature_checked_before_decoding() {
        let result = handler().handle_envelope("%%% not base64 %%%", "bogus");
        assert!(matches!(result, Err(GatewayError::InvalidSignature)));
    }

    #[test]
    fn test_wrong_version() {
        let mut body = payment("success");
        body["version"] = json!(2);
        let (data, signature) = envelope(body);
        let result = handler().handle_envelope(&data, &signature);
        assert!(matches!(
            result,
            Err(GatewayError::InvalidVersion {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_wrong_public_key() {
        let mut body = payment("success");
        body["public_key"] = json!("someone-else");
        let (data, signature) = envelope(body);
        let result = handler().handle_envelope(&data, &signature);
        assert!(matches!(result, Err(GatewayError::InvalidPublicKey)));
    }

    #[test]
    fn test_form_body_missing_fields() {
        let result = handler().handle(b"data=abc");
        assert!(matches!(result, Err(GatewayError::MalformedCallback(_))));
        let result = handler().handle(b"");
        assert!(matches!(result, Err(GatewayError::MalformedCallback(_))));
    }

    #[test]
    fn test_status_table_is_injected() {
        let table = StatusTable::default().with("wait_secure", InvoiceStatus::Successful);
        let handler = CallbackHandler::new("pk", "sk", table);
        let (data, signature) = envelope(payment("wait_secure"));
        let invoices = handler.handle_envelope(&data, &signature).unwrap();
        assert_eq!(invoices[0].status, InvoiceStatus::Successful);
    }
}
