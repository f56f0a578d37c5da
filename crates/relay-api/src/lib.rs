//! # relay-api
//!
//! HTTP API layer for paypay-relay.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - REST endpoints the mobile app calls instead of PayPay directly
//! - Startup-time gateway selection (live or mock)
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/create-payment` | Issue a payment code |
//! | GET | `/payment-status/{merchantPaymentId}` | Payment status |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
