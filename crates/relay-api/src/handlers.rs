//! # Request Handlers
//!
//! Axum request handlers for the relay API.
//! Each handler validates its input and hands off to the configured gateway.

use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use relay_core::{require_payment_id, PaymentDraft, RelayError};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, instrument, warn};

// =============================================================================
// Response Types
// =============================================================================

/// Create payment response
#[derive(Debug, Serialize)]
pub struct CreatePaymentResponse {
    pub success: bool,
    /// Provider response body
    pub data: Value,
    /// Deep-link the app opens to pay
    pub deeplink: Option<String>,
}

/// Payment status response
#[derive(Debug, Serialize)]
pub struct PaymentStatusResponse {
    pub success: bool,
    /// Provider response body
    pub data: Value,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            success: false,
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn relay_error_to_response(err: RelayError) -> ApiError {
    let code = err.status_code();
    let mut response = ErrorResponse::new(err.to_string(), code);
    if let Some(payload) = err.payload() {
        response = response.with_details(payload.clone());
    }
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "paypay-relay",
        "version": env!("CARGO_PKG_VERSION"),
        "mode": if state.gateway.is_mock() { "mock" } else { "live" },
        "environment": state.environment,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Issue a payment code and return its deep-link
#[instrument(skip(state, payload))]
pub async fn create_payment(
    State(state): State<AppState>,
    payload: Result<Json<PaymentDraft>, JsonRejection>,
) -> Result<Json<CreatePaymentResponse>, ApiError> {
    let Json(draft) = payload.map_err(|rejection| {
        warn!("Rejected create-payment body: {}", rejection.body_text());
        relay_error_to_response(RelayError::Validation(rejection.body_text()))
    })?;

    let request = draft.validate().map_err(|e| {
        warn!("Invalid create-payment request: {}", e);
        relay_error_to_response(e)
    })?;

    info!(
        "Creating payment: merchant_payment_id={}, amount={}",
        request.merchant_payment_id, request.amount
    );

    let created = state.gateway.create_payment(&request).await.map_err(|e| {
        error!("Failed to create payment: {}", e);
        relay_error_to_response(e)
    })?;

    Ok(Json(CreatePaymentResponse {
        success: true,
        data: created.data,
        deeplink: created.deeplink,
    }))
}

/// Poll the provider for a payment's status
#[instrument(skip(state))]
pub async fn payment_status(
    State(state): State<AppState>,
    Path(merchant_payment_id): Path<String>,
) -> Result<Json<PaymentStatusResponse>, ApiError> {
    let id = require_payment_id(&merchant_payment_id).map_err(relay_error_to_response)?;

    let report = state.gateway.payment_status(id).await.map_err(|e| {
        match &e {
            RelayError::NotFound { .. } => info!("{}", e),
            _ => error!("Failed to fetch payment status: {}", e),
        }
        relay_error_to_response(e)
    })?;

    match report.state() {
        Some(payment_state) if payment_state.is_terminal() => {
            info!("Payment {} settled: {}", id, payment_state)
        }
        Some(payment_state) => info!("Payment {} still {}", id, payment_state),
        None => warn!("PayPay returned no status for payment {}", id),
    }

    Ok(Json(PaymentStatusResponse {
        success: true,
        data: report.data,
    }))
}

/// Status route hit without an id
pub async fn missing_payment_id() -> ApiError {
    relay_error_to_response(RelayError::Validation(
        "Missing required fields: merchantPaymentId".to_string(),
    ))
}
