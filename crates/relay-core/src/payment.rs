//! # Payment Types
//!
//! Inbound payment requests and the results the gateways hand back.

use crate::error::{RelayError, RelayResult};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// The only currency the relay issues codes in
pub const CURRENCY: &str = "JPY";

/// Unvalidated create-payment body as the mobile app sends it
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDraft {
    #[serde(default)]
    pub amount: Option<Number>,
    #[serde(default)]
    pub merchant_payment_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl PaymentDraft {
    /// Check required fields and produce a request the gateways accept.
    ///
    /// Blank strings and a zero amount count as missing.
    pub fn validate(self) -> RelayResult<CreatePaymentRequest> {
        let mut missing = Vec::new();

        let amount = match &self.amount {
            None => {
                missing.push("amount");
                None
            }
            Some(n) => match n.as_u64() {
                Some(0) => {
                    missing.push("amount");
                    None
                }
                Some(v) => Some(v),
                None => {
                    return Err(RelayError::Validation(format!(
                        "amount must be a positive whole number of {}, got {}",
                        CURRENCY, n
                    )))
                }
            },
        };

        let merchant_payment_id = match non_blank(self.merchant_payment_id) {
            Some(id) => Some(require_payment_id(&id)?.to_string()),
            None => {
                missing.push("merchantPaymentId");
                None
            }
        };

        let description = non_blank(self.description);
        if description.is_none() {
            missing.push("description");
        }

        match (amount, merchant_payment_id, description) {
            (Some(amount), Some(merchant_payment_id), Some(description)) => {
                Ok(CreatePaymentRequest {
                    amount,
                    merchant_payment_id,
                    description,
                })
            }
            _ => Err(RelayError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            ))),
        }
    }
}

/// Check a merchant payment id is present and safe to put in a resource path.
///
/// Only `A-Z a-z 0-9 - _ .` are accepted, and an id made only of dots is
/// rejected. Anything else would be percent-encoded or normalised by the
/// HTTP client, so the path on the wire would differ from the signed one.
///
/// Returns the id with surrounding whitespace removed.
pub fn require_payment_id(raw: &str) -> RelayResult<&str> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(RelayError::Validation(
            "Missing required fields: merchantPaymentId".to_string(),
        ));
    }
    let unreserved = id
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'));
    if !unreserved || id.bytes().all(|b| b == b'.') {
        return Err(RelayError::Validation(format!(
            "merchantPaymentId contains characters not allowed in a path: {:?}",
            id
        )));
    }
    Ok(id)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Validated request to issue a payment code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    /// Amount in yen
    pub amount: u64,
    /// Caller-chosen id the payment is tracked by
    pub merchant_payment_id: String,
    pub description: String,
}

impl CreatePaymentRequest {
    pub fn new(
        amount: u64,
        merchant_payment_id: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            merchant_payment_id: merchant_payment_id.into(),
            description: description.into(),
        }
    }
}

/// A payment code the provider issued
#[derive(Debug, Clone, Serialize)]
pub struct PaymentCreated {
    /// Provider response body, forwarded untouched
    pub data: Value,
    /// App deep-link extracted from `data.deeplink`
    pub deeplink: Option<String>,
}

impl PaymentCreated {
    /// Wrap a provider body and pull the deep-link out of it
    pub fn from_provider_body(data: Value) -> Self {
        let deeplink = data
            .pointer("/data/deeplink")
            .and_then(|v| v.as_str())
            .map(String::from);
        Self { data, deeplink }
    }
}

/// Provider view of a payment
#[derive(Debug, Clone, Serialize)]
pub struct PaymentStatusReport {
    /// Provider response body, forwarded untouched
    pub data: Value,
}

impl PaymentStatusReport {
    pub fn new(data: Value) -> Self {
        Self { data }
    }

    /// Status reported under `data.status`, if any
    pub fn state(&self) -> Option<PaymentState> {
        self.data
            .pointer("/data/status")
            .and_then(|v| v.as_str())
            .map(PaymentState::from)
    }
}

/// Payment lifecycle states the provider reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentState {
    Created,
    Authorized,
    Completed,
    Failed,
    Canceled,
    Expired,
    Refunded,
    Unknown(String),
}

impl PaymentState {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentState::Created => "CREATED",
            PaymentState::Authorized => "AUTHORIZED",
            PaymentState::Completed => "COMPLETED",
            PaymentState::Failed => "FAILED",
            PaymentState::Canceled => "CANCELED",
            PaymentState::Expired => "EXPIRED",
            PaymentState::Refunded => "REFUNDED",
            PaymentState::Unknown(raw) => raw,
        }
    }

    /// True once the payment can no longer change on its own
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            PaymentState::Created | PaymentState::Authorized | PaymentState::Unknown(_)
        )
    }
}

impl From<&str> for PaymentState {
    fn from(raw: &str) -> Self {
        match raw {
            "CREATED" => PaymentState::Created,
            "AUTHORIZED" => PaymentState::Authorized,
            "COMPLETED" => PaymentState::Completed,
            "FAILED" => PaymentState::Failed,
            "CANCELED" => PaymentState::Canceled,
            "EXPIRED" => PaymentState::Expired,
            "REFUNDED" => PaymentState::Refunded,
            other => PaymentState::Unknown(other.to_string()),
        }
    }
}

impl std::fmt::Display for PaymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft(body: Value) -> PaymentDraft {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_valid_draft() {
        let request = draft(json!({
            "amount": 100,
            "merchantPaymentId": "abc",
            "description": "test"
        }))
        .validate()
        .unwrap();

        assert_eq!(request, CreatePaymentRequest::new(100, "abc", "test"));
    }

    #[test]
    fn test_missing_amount() {
        let err = draft(json!({"merchantPaymentId": "abc", "description": "test"}))
            .validate()
            .unwrap_err();

        assert!(matches!(err, RelayError::Validation(_)));
        assert!(err.to_string().contains("amount"));
    }

    #[test]
    fn test_blank_fields_count_as_missing() {
        let err = draft(json!({"amount": 0, "merchantPaymentId": "  ", "description": ""}))
            .validate()
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("amount"));
        assert!(message.contains("merchantPaymentId"));
        assert!(message.contains("description"));
    }

    #[test]
    fn test_require_payment_id() {
        assert_eq!(require_payment_id(" abc-1 ").unwrap(), "abc-1");
        assert!(require_payment_id("").is_err());
        assert!(require_payment_id("a/b").is_err());
        assert!(require_payment_id("a?b=1").is_err());
        assert!(require_payment_id("a b").is_err());
        assert_eq!(require_payment_id("order_7.v2").unwrap(), "order_7.v2");

        // Dot segments get collapsed by URL normalisation
        assert!(require_payment_id(".").is_err());
        assert!(require_payment_id("..").is_err());
        assert!(require_payment_id("...").is_err());

        // Percent-encoded on the wire
        assert!(require_payment_id("café").is_err());
        for id in ["a\"b", "a<b", "a>b", "a{b", "a}b", "a`b", "a|b", "a\\b"] {
            assert!(require_payment_id(id).is_err(), "{id} accepted");
        }

        let err = draft(json!({"amount": 1, "merchantPaymentId": "../x", "description": "d"}))
            .validate()
            .unwrap_err();
        assert!(matches!(err, RelayError::Validation(_)));
    }

    #[test]
    fn test_fractional_amount_rejected() {
        let err = draft(json!({
            "amount": 10.5,
            "merchantPaymentId": "abc",
            "description": "test"
        }))
        .validate()
        .unwrap_err();

        assert!(matches!(err, RelayError::Validation(_)));
    }

    #[test]
    fn test_deeplink_extraction() {
        let created = PaymentCreated::from_provider_body(json!({
            "resultInfo": {"code": "SUCCESS"},
            "data": {"codeId": "c1", "deeplink": "paypay://payment?link_key=x"}
        }));
        assert_eq!(created.deeplink.as_deref(), Some("paypay://payment?link_key=x"));

        let created = PaymentCreated::from_provider_body(json!({"data": {}}));
        assert!(created.deeplink.is_none());
    }

    #[test]
    fn test_status_state() {
        let report = PaymentStatusReport::new(json!({"data": {"status": "COMPLETED"}}));
        assert_eq!(report.state(), Some(PaymentState::Completed));
        assert!(report.state().unwrap().is_terminal());

        let report = PaymentStatusReport::new(json!({"data": {"status": "PENDING_X"}}));
        assert_eq!(report.state(), Some(PaymentState::Unknown("PENDING_X".into())));
        assert!(!PaymentState::Created.is_terminal());
    }
}
