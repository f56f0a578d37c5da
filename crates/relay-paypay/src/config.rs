//! # PayPay Configuration
//!
//! Configuration management for the PayPay integration.
//! All secrets are loaded from environment variables.

use crate::credentials::Credentials;
use relay_core::{RelayError, RelayResult};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Sandbox API host
pub const SANDBOX_BASE_URL: &str = "https://stg-api.sandbox.paypay.ne.jp";

/// Production API host
pub const PRODUCTION_BASE_URL: &str = "https://api.paypay.ne.jp";

/// Where PayPay sends the user back to once the payment is done
pub const DEFAULT_REDIRECT_URL: &str = "myapp://payment-complete";

/// Timeout for issuing a payment code
pub const CREATE_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for a status lookup
pub const STATUS_TIMEOUT: Duration = Duration::from_secs(15);

/// Which PayPay deployment to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayPayEnvironment {
    #[default]
    Sandbox,
    Production,
}

impl PayPayEnvironment {
    pub fn base_url(&self) -> &'static str {
        match self {
            PayPayEnvironment::Sandbox => SANDBOX_BASE_URL,
            PayPayEnvironment::Production => PRODUCTION_BASE_URL,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PayPayEnvironment::Sandbox => "sandbox",
            PayPayEnvironment::Production => "production",
        }
    }
}

impl FromStr for PayPayEnvironment {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" | "staging" | "stg" => Ok(PayPayEnvironment::Sandbox),
            "production" | "prod" => Ok(PayPayEnvironment::Production),
            other => Err(RelayError::Configuration(format!(
                "PAYPAY_ENVIRONMENT must be sandbox or production, got {other}"
            ))),
        }
    }
}

impl std::fmt::Display for PayPayEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// PayPay API configuration
#[derive(Debug, Clone)]
pub struct PayPayConfig {
    /// Key, secret and merchant id
    pub credentials: Credentials,

    /// Sandbox or production
    pub environment: PayPayEnvironment,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// App deep-link PayPay redirects to after payment
    pub redirect_url: String,

    pub create_timeout: Duration,
    pub status_timeout: Duration,
}

impl PayPayConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `PAYPAY_API_KEY`
    /// - `PAYPAY_API_SECRET`
    /// - `PAYPAY_MERCHANT_ID`
    ///
    /// Optional: `PAYPAY_ENVIRONMENT`, `PAYPAY_API_BASE_URL`, `PAYPAY_REDIRECT_URL`.
    pub fn from_env() -> RelayResult<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> RelayResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| RelayError::Configuration(format!("{name} not set")))
        };

        let credentials = Credentials::new(
            require("PAYPAY_API_KEY")?,
            require("PAYPAY_API_SECRET")?,
            require("PAYPAY_MERCHANT_ID")?,
        )?;

        let environment = match lookup("PAYPAY_ENVIRONMENT") {
            Some(raw) if !raw.trim().is_empty() => raw.parse::<PayPayEnvironment>()?,
            _ => PayPayEnvironment::default(),
        };

        let mut config = Self::new(credentials, environment);

        if let Some(url) = lookup("PAYPAY_API_BASE_URL").filter(|v| !v.trim().is_empty()) {
            config = config.with_api_base_url(url);
        }
        if let Some(url) = lookup("PAYPAY_REDIRECT_URL").filter(|v| !v.trim().is_empty()) {
            config = config.with_redirect_url(url);
        }

        Ok(config)
    }

    /// Create config with explicit values (for testing)
    pub fn new(credentials: Credentials, environment: PayPayEnvironment) -> Self {
        Self {
            credentials,
            environment,
            api_base_url: environment.base_url().to_string(),
            redirect_url: DEFAULT_REDIRECT_URL.to_string(),
            create_timeout: CREATE_TIMEOUT,
            status_timeout: STATUS_TIMEOUT,
        }
    }

    /// Check if talking to production
    pub fn is_production(&self) -> bool {
        self.environment == PayPayEnvironment::Production
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder: set the app redirect deep-link
    pub fn with_redirect_url(mut self, url: impl Into<String>) -> Self {
        self.redirect_url = url.into();
        self
    }

    /// Builder: override the per-call timeouts
    pub fn with_timeouts(mut self, create: Duration, status: Duration) -> Self {
        self.create_timeout = create;
        self.status_timeout = status;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("PAYPAY_API_KEY", "key"),
        ("PAYPAY_API_SECRET", "secret"),
        ("PAYPAY_MERCHANT_ID", "merchant"),
    ];

    #[test]
    fn test_defaults_to_sandbox() {
        let config = PayPayConfig::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(config.environment, PayPayEnvironment::Sandbox);
        assert_eq!(config.api_base_url, SANDBOX_BASE_URL);
        assert_eq!(config.redirect_url, DEFAULT_REDIRECT_URL);
        assert_eq!(config.create_timeout, Duration::from_secs(30));
        assert_eq!(config.status_timeout, Duration::from_secs(15));
        assert!(!config.is_production());
    }

    #[test]
    fn test_production_and_overrides() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("PAYPAY_ENVIRONMENT", "Production"));
        vars.push(("PAYPAY_REDIRECT_URL", "shop://done"));
        let config = PayPayConfig::from_lookup(lookup(&vars)).unwrap();

        assert!(config.is_production());
        assert_eq!(config.api_base_url, PRODUCTION_BASE_URL);
        assert_eq!(config.redirect_url, "shop://done");

        vars.push(("PAYPAY_API_BASE_URL", "http://127.0.0.1:9999/"));
        let config = PayPayConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.api_base_url, "http://127.0.0.1:9999");
    }

    #[test]
    fn test_missing_credentials() {
        let err = PayPayConfig::from_lookup(lookup(&REQUIRED[..2])).unwrap_err();
        assert!(matches!(err, RelayError::Configuration(_)));
        assert!(err.to_string().contains("PAYPAY_MERCHANT_ID"));
    }

    #[test]
    fn test_unknown_environment() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("PAYPAY_ENVIRONMENT", "moon"));
        assert!(PayPayConfig::from_lookup(lookup(&vars)).is_err());
    }
}
