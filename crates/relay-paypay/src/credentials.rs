//! Credential triple for PayPay API authentication.

use relay_core::{RelayError, RelayResult};
use secrecy::{ExposeSecret, SecretString};

/// API key, secret and merchant id, fixed for the process lifetime.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    api_secret: SecretString,
    merchant_id: String,
}

impl Credentials {
    /// Create credentials, rejecting any blank part.
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        merchant_id: impl Into<String>,
    ) -> RelayResult<Self> {
        let api_key = api_key.into();
        let api_secret = api_secret.into();
        let merchant_id = merchant_id.into();

        for (name, value) in [
            ("API key", &api_key),
            ("API secret", &api_secret),
            ("merchant id", &merchant_id),
        ] {
            if value.trim().is_empty() {
                return Err(RelayError::Configuration(format!("PayPay {name} is empty")));
            }
        }

        Ok(Self {
            api_key,
            api_secret: SecretString::from(api_secret),
            merchant_id,
        })
    }

    /// The public key id sent in the Authorization header.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Merchant the requests act on behalf of.
    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    /// Get the API secret for signing.
    ///
    /// This method exposes the secret - use carefully.
    pub fn expose_secret(&self) -> &str {
        self.api_secret.expose_secret()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("merchant_id", &self.merchant_id)
            .finish()
    }
}
