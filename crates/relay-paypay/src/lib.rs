//! # relay-paypay
//!
//! PayPay gateways for paypay-relay.
//!
//! This crate provides:
//!
//! 1. **RequestSigner** - OPA-Auth header construction
//!    - HMAC-SHA256 over method, path, key, epoch, nonce and content hash
//!    - Injectable clock and random source
//!
//! 2. **LiveGateway** - signed calls to the PayPay Open Payment API
//!    - `POST /v2/codes` to issue an app deep-link
//!    - `GET /v2/payments/{id}` to poll status
//!
//! 3. **MockGateway** - canned responses, no network, no signing
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use relay_paypay::{LiveGateway, PayPayConfig};
//! use relay_core::{CreatePaymentRequest, PaymentGateway};
//!
//! // Create gateway from environment
//! let gateway = LiveGateway::new(PayPayConfig::from_env()?)?;
//!
//! // Issue a payment code
//! let created = gateway
//!     .create_payment(&CreatePaymentRequest::new(100, "order-1", "Coffee"))
//!     .await?;
//!
//! // Send created.deeplink to the app
//! ```

pub mod clock;
pub mod config;
pub mod credentials;
pub mod live;
pub mod mock;
pub mod signing;

// Re-exports
pub use clock::{Clock, FixedClock, FixedRandom, RandomSource, SecureRandom, SystemClock};
pub use config::{PayPayConfig, PayPayEnvironment};
pub use credentials::Credentials;
pub use live::LiveGateway;
pub use mock::MockGateway;
pub use signing::{
    content_hash, sign_with, HttpMethod, OpaAuthorization, RequestSigner, SignedHeaders,
};
