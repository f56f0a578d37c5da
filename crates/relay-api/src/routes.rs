//! # Routes
//!
//! Axum router configuration for the relay API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
///   - GET  /health - Liveness payload (also served at /)
///   - POST /create-payment - Issue a PayPay code, returns the app deep-link
///   - GET  /payment-status/{merchantPaymentId} - Poll a payment
pub fn create_router(state: AppState) -> Router {
    // The mobile app and local web tooling call from arbitrary origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let payment_routes = Router::new()
        .route("/create-payment", post(handlers::create_payment))
        .route(
            "/payment-status/{merchant_payment_id}",
            get(handlers::payment_status),
        )
        .route("/payment-status", get(handlers::missing_payment_id))
        .route("/payment-status/", get(handlers::missing_payment_id));

    Router::new()
        // Health check at root
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .merge(payment_routes)
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        // State
        .with_state(state)
}
