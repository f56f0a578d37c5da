//! # relay-core
//!
//! Core types and traits for the paypay-relay payment backend.
//!
//! This crate provides:
//! - `PaymentGateway` trait for live and mock provider access
//! - `PaymentDraft` and `CreatePaymentRequest` for inbound validation
//! - `PaymentCreated`, `PaymentStatusReport` and `PaymentState` results
//! - `RelayError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use relay_core::{PaymentDraft, PaymentGateway};
//!
//! // Validate the inbound JSON
//! let request = draft.validate()?;
//!
//! // Issue a payment code through whichever gateway was selected at startup
//! let created = gateway.create_payment(&request).await?;
//!
//! // Hand created.deeplink back to the mobile app
//! ```

pub mod error;
pub mod gateway;
pub mod payment;

// Re-exports for convenience
pub use error::{RelayError, RelayResult};
pub use gateway::{BoxedPaymentGateway, PaymentGateway};
pub use payment::{
    require_payment_id, CreatePaymentRequest, PaymentCreated, PaymentDraft, PaymentState,
    PaymentStatusReport, CURRENCY,
};
