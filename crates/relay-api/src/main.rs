//! # PayPay Relay
//!
//! Backend that signs PayPay API calls on behalf of the mobile app.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export PAYPAY_API_KEY=...
//! export PAYPAY_API_SECRET=...
//! export PAYPAY_MERCHANT_ID=...
//! export PAYPAY_ENVIRONMENT=sandbox
//!
//! # Or skip PayPay entirely
//! export MOCK_MODE=true
//!
//! # Run the server
//! paypay-relay
//! ```

use relay_api::{routes, AppConfig, AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();

    // Initialize logging
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    if config.json_logs {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    // Credentials are checked here; a missing one stops the process
    let state = AppState::from_config(config)?;

    let addr = state.config.socket_addr()?;

    info!("Environment: {}", state.environment);
    info!("Payment gateway: {}", state.gateway.gateway_name());

    let app = routes::create_router(state);

    info!("PayPay relay starting on http://{}", addr);
    info!("Create payment: POST http://{}/create-payment", addr);
    info!("Payment status: GET http://{}/payment-status/{{merchantPaymentId}}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
