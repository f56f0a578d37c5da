//! # Relay Error Types
//!
//! Typed error handling for the payment relay.
//! All gateway operations return `Result<T, RelayError>`.

use serde_json::Value;
use thiserror::Error;

/// Core error type for all relay operations
#[derive(Debug, Error)]
pub enum RelayError {
    /// Missing or malformed input from the client
    #[error("Validation error: {0}")]
    Validation(String),

    /// Provider returned an error, was unreachable, or timed out
    #[error("Upstream error: {message}")]
    Upstream {
        /// HTTP status from the provider, if a response arrived at all
        status: Option<u16>,
        message: String,
        /// Provider error body, surfaced to the caller when available
        payload: Option<Value>,
    },

    /// Provider does not know the payment id
    #[error("Payment not found: {merchant_payment_id}")]
    NotFound { merchant_payment_id: String },

    /// Credentials absent with mock mode disabled, or otherwise unusable config
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Provider body could not be parsed
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RelayError {
    /// Upstream failure without any provider response (network, timeout)
    pub fn unreachable(message: impl Into<String>) -> Self {
        RelayError::Upstream {
            status: None,
            message: message.into(),
            payload: None,
        }
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::Validation(_) => 400,
            RelayError::NotFound { .. } => 404,
            RelayError::Upstream { .. } => 500,
            RelayError::Configuration(_) => 500,
            RelayError::Serialization(_) => 500,
        }
    }

    /// Provider payload to surface alongside the error message
    pub fn payload(&self) -> Option<&Value> {
        match self {
            RelayError::Upstream { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }
}

/// Result type alias for relay operations
pub type RelayResult<T> = Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_codes() {
        assert_eq!(RelayError::Validation("amount".into()).status_code(), 400);
        assert_eq!(
            RelayError::NotFound {
                merchant_payment_id: "abc".into()
            }
            .status_code(),
            404
        );
        assert_eq!(RelayError::unreachable("timeout").status_code(), 500);
        assert_eq!(RelayError::Configuration("no key".into()).status_code(), 500);
    }

    #[test]
    fn test_not_found_is_distinct_from_upstream() {
        let not_found = RelayError::NotFound {
            merchant_payment_id: "abc".into(),
        };
        assert_ne!(
            not_found.status_code(),
            RelayError::unreachable("boom").status_code()
        );
        assert_eq!(not_found.to_string(), "Payment not found: abc");
    }

    #[test]
    fn test_upstream_payload_surfaced() {
        let err = RelayError::Upstream {
            status: Some(400),
            message: "INVALID_PARAMS".into(),
            payload: Some(json!({"resultInfo": {"code": "INVALID_PARAMS"}})),
        };
        assert_eq!(
            err.payload().and_then(|p| p.pointer("/resultInfo/code")),
            Some(&json!("INVALID_PARAMS"))
        );
        assert!(RelayError::Validation("x".into()).payload().is_none());
    }
}
