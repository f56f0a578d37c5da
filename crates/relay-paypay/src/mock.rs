//! # Mock Gateway
//!
//! Fabricates PayPay-shaped responses without touching the network or the
//! signer. Selected at startup when `MOCK_MODE` is on.

use async_trait::async_trait;
use chrono::Utc;
use relay_core::{
    CreatePaymentRequest, PaymentCreated, PaymentGateway, PaymentStatusReport, RelayResult,
    CURRENCY,
};
use serde_json::json;
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

/// Artificial latency before a mock code is issued
pub const MOCK_CREATE_DELAY: Duration = Duration::from_millis(500);

/// Seconds a mock code claims to stay valid
const MOCK_CODE_TTL_SECS: i64 = 300;

/// Gateway returning canned success payloads
#[derive(Debug, Clone)]
pub struct MockGateway {
    delay: Duration,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            delay: MOCK_CREATE_DELAY,
        }
    }

    /// Builder: change the artificial delay
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Deep-link the mock hands back for a request
    pub fn deeplink_for(request: &CreatePaymentRequest) -> String {
        format!(
            "paypay://payment?merchantPaymentId={}&amount={}",
            request.merchant_payment_id, request.amount
        )
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    #[instrument(skip(self, request), fields(merchant_payment_id = %request.merchant_payment_id))]
    async fn create_payment(&self, request: &CreatePaymentRequest) -> RelayResult<PaymentCreated> {
        tokio::time::sleep(self.delay).await;

        let now = Utc::now().timestamp();
        let code_id = format!("mock-code-{}", Uuid::new_v4().simple());

        info!("Mock PayPay code issued: {}", code_id);

        Ok(PaymentCreated::from_provider_body(json!({
            "resultInfo": {
                "code": "SUCCESS",
                "message": "Success",
                "codeId": "08100001"
            },
            "data": {
                "codeId": code_id,
                "url": format!("https://mock.paypay.invalid/qr/{}", code_id),
                "deeplink": Self::deeplink_for(request),
                "expiryDate": now + MOCK_CODE_TTL_SECS,
                "merchantPaymentId": request.merchant_payment_id,
                "amount": {"amount": request.amount, "currency": CURRENCY},
                "orderDescription": request.description,
                "codeType": "ORDER_QR",
                "requestedAt": now,
                "redirectType": "APP_DEEPLINK",
                "isAuthorization": false
            }
        })))
    }

    #[instrument(skip(self))]
    async fn payment_status(&self, merchant_payment_id: &str) -> RelayResult<PaymentStatusReport> {
        let now = Utc::now().timestamp();

        Ok(PaymentStatusReport::new(json!({
            "resultInfo": {
                "code": "SUCCESS",
                "message": "Success",
                "codeId": "08100001"
            },
            "data": {
                "paymentId": format!("mock-payment-{}", Uuid::new_v4().simple()),
                "status": "COMPLETED",
                "acceptedAt": now,
                "merchantPaymentId": merchant_payment_id,
                "requestedAt": now
            }
        })))
    }

    fn gateway_name(&self) -> &'static str {
        "mock"
    }

    fn is_mock(&self) -> bool {
        true
    }
}
