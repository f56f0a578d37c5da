//! # Application State
//!
//! Shared state for the Axum application.
//! Holds the payment gateway chosen at startup and the server configuration.

use relay_core::{BoxedPaymentGateway, RelayResult};
use relay_paypay::{LiveGateway, MockGateway, PayPayConfig};
use std::sync::Arc;
use tracing::{info, warn};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Fabricate provider responses instead of calling PayPay
    pub mock_mode: bool,
    /// Emit logs as JSON lines
    pub json_logs: bool,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            mock_mode: lookup("MOCK_MODE").map(|v| is_truthy(&v)).unwrap_or(false),
            json_logs: lookup("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            mock_mode: false,
            json_logs: false,
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Live or mock gateway, fixed for the process lifetime
    pub gateway: BoxedPaymentGateway,
    /// Provider environment label for health output
    pub environment: &'static str,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Pick the gateway for `config`, reading PayPay settings from the environment
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        Self::select(config, PayPayConfig::from_env)
    }

    /// Pick the gateway for `config`, reading PayPay settings through `lookup`.
    pub fn from_lookup<F>(config: AppConfig, lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::select(config, || PayPayConfig::from_lookup(lookup))
    }

    /// Missing credentials are fatal unless mock mode is on.
    fn select<L>(config: AppConfig, load: L) -> anyhow::Result<Self>
    where
        L: FnOnce() -> RelayResult<PayPayConfig>,
    {
        if config.mock_mode {
            warn!("MOCK_MODE enabled: PayPay will not be contacted");
            return Ok(Self {
                gateway: Arc::new(MockGateway::new()),
                environment: "mock",
                config,
            });
        }

        let paypay = load().map_err(|e| anyhow::anyhow!("Failed to initialize PayPay: {}", e))?;
        if paypay.is_production() {
            warn!("PayPay PRODUCTION environment: payments are real");
        } else {
            info!("PayPay sandbox environment");
        }
        let environment = paypay.environment.as_str();
        let gateway = LiveGateway::new(paypay)?;

        Ok(Self {
            gateway: Arc::new(gateway),
            environment,
            config,
        })
    }

    /// State around an already-built gateway
    pub fn with_gateway(gateway: BoxedPaymentGateway, config: AppConfig) -> Self {
        let environment = if gateway.is_mock() { "mock" } else { "custom" };
        Self {
            gateway,
            environment,
            config,
        }
    }
}
