//! # Live PayPay Gateway
//!
//! Signed calls to the PayPay Open Payment API.
//! This is the gateway used whenever mock mode is off.

use crate::config::PayPayConfig;
use crate::signing::{HttpMethod, RequestSigner};
use async_trait::async_trait;
use relay_core::{
    require_payment_id, CreatePaymentRequest, PaymentCreated, PaymentGateway,
    PaymentStatusReport, RelayError, RelayResult, CURRENCY,
};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

/// Resource path for issuing payment codes
pub const CODES_PATH: &str = "/v2/codes";

/// Resource path for one payment's details
pub fn payment_path(merchant_payment_id: &str) -> String {
    format!("/v2/payments/{}", merchant_payment_id)
}

/// PayPay gateway backed by signed HTTPS calls
pub struct LiveGateway {
    config: PayPayConfig,
    signer: RequestSigner,
    client: Client,
}

impl LiveGateway {
    /// Create a gateway that signs with the wall clock and a CSPRNG
    pub fn new(config: PayPayConfig) -> RelayResult<Self> {
        let signer = RequestSigner::new(config.credentials.clone());
        Self::with_signer(config, signer)
    }

    /// Create a gateway with a caller-supplied signer
    pub fn with_signer(config: PayPayConfig, signer: RequestSigner) -> RelayResult<Self> {
        // Timeouts are set per request
        let client = Client::builder().build().map_err(|e| {
            RelayError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            config,
            signer,
            client,
        })
    }

    /// Build the code-creation payload PayPay expects
    fn build_code_payload<'a>(
        &'a self,
        request: &'a CreatePaymentRequest,
        requested_at: i64,
    ) -> CreateCodePayload<'a> {
        CreateCodePayload {
            merchant_payment_id: &request.merchant_payment_id,
            amount: MoneyAmount {
                amount: request.amount,
                currency: CURRENCY,
            },
            code_type: "ORDER_QR",
            order_description: &request.description,
            is_authorization: false,
            redirect_url: &self.config.redirect_url,
            redirect_type: "APP_DEEPLINK",
            requested_at,
        }
    }

    /// Sign and send one request, returning status and raw body
    async fn send_signed(
        &self,
        method: HttpMethod,
        resource_path: &str,
        body: Vec<u8>,
        timeout: Duration,
    ) -> RelayResult<(StatusCode, String)> {
        let headers = self.signer.build_auth_headers(method, resource_path, &body);
        let url = format!("{}{}", self.config.api_base_url, resource_path);

        let mut builder = self.client.request(method.into(), &url).timeout(timeout);
        for (name, value) in headers.iter() {
            builder = builder.header(name, value);
        }
        if method == HttpMethod::Post {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                RelayError::unreachable(format!(
                    "PayPay did not answer within {}s",
                    timeout.as_secs()
                ))
            } else {
                RelayError::unreachable(format!("PayPay unreachable: {}", e))
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RelayError::unreachable(e.to_string()))?;

        Ok((status, body))
    }
}

#[async_trait]
impl PaymentGateway for LiveGateway {
    #[instrument(skip(self, request), fields(merchant_payment_id = %request.merchant_payment_id))]
    async fn create_payment(&self, request: &CreatePaymentRequest) -> RelayResult<PaymentCreated> {
        let payload = self.build_code_payload(request, self.signer.unix_now());
        let body = serde_json::to_vec(&payload)
            .map_err(|e| RelayError::Serialization(format!("Failed to encode payload: {}", e)))?;

        debug!("Creating PayPay code: amount={} {}", request.amount, CURRENCY);

        let (status, body) = self
            .send_signed(HttpMethod::Post, CODES_PATH, body, self.config.create_timeout)
            .await?;

        if !status.is_success() {
            error!("PayPay API error: status={}, body={}", status, body);
            return Err(provider_error(status, &body));
        }

        let created = PaymentCreated::from_provider_body(parse_body(&body)?);

        info!(
            "Created PayPay code: deeplink={}",
            created.deeplink.as_deref().unwrap_or("<none>")
        );

        Ok(created)
    }

    #[instrument(skip(self))]
    async fn payment_status(&self, merchant_payment_id: &str) -> RelayResult<PaymentStatusReport> {
        let merchant_payment_id = require_payment_id(merchant_payment_id)?;
        let (status, body) = self
            .send_signed(
                HttpMethod::Get,
                &payment_path(merchant_payment_id),
                Vec::new(),
                self.config.status_timeout,
            )
            .await?;

        if status == StatusCode::NOT_FOUND {
            info!("PayPay has no payment {}", merchant_payment_id);
            return Err(RelayError::NotFound {
                merchant_payment_id: merchant_payment_id.to_string(),
            });
        }

        if !status.is_success() {
            error!("PayPay API error: status={}, body={}", status, body);
            return Err(provider_error(status, &body));
        }

        let report = PaymentStatusReport::new(parse_body(&body)?);

        debug!(
            "PayPay payment status: {}",
            report.state().map(|s| s.to_string()).unwrap_or_default()
        );

        Ok(report)
    }

    fn gateway_name(&self) -> &'static str {
        "paypay"
    }
}

fn parse_body(body: &str) -> RelayResult<Value> {
    serde_json::from_str(body).map_err(|e| {
        RelayError::Serialization(format!("Failed to parse PayPay response: {}", e))
    })
}

/// Map a non-success PayPay response to an upstream error
fn provider_error(status: StatusCode, body: &str) -> RelayError {
    let payload = serde_json::from_str::<Value>(body).ok();

    let message = payload
        .clone()
        .and_then(|p| serde_json::from_value::<PayPayErrorResponse>(p).ok())
        .map(|e| match e.result_info.message {
            Some(message) => format!("{}: {}", e.result_info.code, message),
            None => e.result_info.code,
        })
        .unwrap_or_else(|| format!("HTTP {}", status));

    RelayError::Upstream {
        status: Some(status.as_u16()),
        message,
        payload,
    }
}

// =============================================================================
// PayPay API Types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateCodePayload<'a> {
    merchant_payment_id: &'a str,
    amount: MoneyAmount,
    code_type: &'static str,
    order_description: &'a str,
    is_authorization: bool,
    redirect_url: &'a str,
    redirect_type: &'static str,
    requested_at: i64,
}

#[derive(Debug, Serialize)]
struct MoneyAmount {
    amount: u64,
    currency: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayPayErrorResponse {
    result_info: ResultInfo,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    code: String,
    #[serde(default)]
    message: Option<String>,
}
