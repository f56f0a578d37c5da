//! # Payment Gateway Trait
//!
//! Strategy trait for reaching the payment provider.
//!
//! ## Design Pattern
//!
//! The gateway is chosen once at startup and handed to every handler, so
//! request handling never branches on mock mode.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PaymentGateway (trait)                   │
//! │  ├── create_payment()                                       │
//! │  ├── payment_status()                                       │
//! │  └── gateway_name()                                         │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                  ┌─────────┴─────────┐
//!                  │                   │
//!          ┌───────┴───────┐   ┌───────┴───────┐
//!          │  LiveGateway  │   │  MockGateway  │
//!          │ (signed HTTP) │   │ (canned data) │
//!          └───────────────┘   └───────────────┘
//! ```

use crate::error::RelayResult;
use crate::payment::{CreatePaymentRequest, PaymentCreated, PaymentStatusReport};
use async_trait::async_trait;
use std::sync::Arc;

/// Access to the payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Issue a payment code for the app to open.
    ///
    /// # Returns
    /// The provider body and the deep-link extracted from it.
    async fn create_payment(&self, request: &CreatePaymentRequest)
        -> RelayResult<PaymentCreated>;

    /// Look up a payment by the merchant payment id it was created with.
    ///
    /// Returns `RelayError::NotFound` when the provider does not know the id.
    async fn payment_status(&self, merchant_payment_id: &str)
        -> RelayResult<PaymentStatusReport>;

    /// Gateway name (for logging and health output).
    fn gateway_name(&self) -> &'static str;

    /// True when responses are fabricated locally.
    fn is_mock(&self) -> bool {
        false
    }
}

/// Type alias for a shared gateway (dynamic dispatch)
pub type BoxedPaymentGateway = Arc<dyn PaymentGateway>;
