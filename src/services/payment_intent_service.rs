use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use validator::Validate;

use crate::models::{ClientSecretResponse, CreatePaymentIntentRequest};
use crate::utils::error::AppResult;

pub const STRIPE_API_BASE: &str = "https://api.stripe.com";

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("request to payment processor failed: {0}")]
    Transport(String),
    #[error("payment processor returned {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("payment processor response had no client secret")]
    MissingClientSecret,
}

/// Creates card-payable payment intents on the external processor.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Returns the intent's client secret. Amount is in minor units.
    async fn create_intent(&self, amount_in_cents: i64) -> Result<String, PaymentError>;
}

#[derive(Debug, Deserialize)]
struct PaymentIntent {
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

/// Stripe REST client, `POST /v1/payment_intents`.
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    api_base: String,
    currency: String,
}

impl StripeClient {
    pub fn new(secret_key: &str, api_base: &str, currency: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();

        Self {
            http,
            secret_key: secret_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            currency: currency.to_lowercase(),
        }
    }
}

#[async_trait]
impl PaymentProcessor for StripeClient {
    async fn create_intent(&self, amount_in_cents: i64) -> Result<String, PaymentError> {
        log::info!("💳 Creating payment intent: {} {}", amount_in_cents, self.currency);

        let url = format!("{}/v1/payment_intents", self.api_base);
        let amount = amount_in_cents.to_string();
        let params = [
            ("amount", amount.as_str()),
            ("currency", self.currency.as_str()),
            ("payment_method_types[]", "card"),
        ];

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<StripeErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error.message)
                .unwrap_or_else(|| status.to_string());
            return Err(PaymentError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let intent: PaymentIntent = response
            .json()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        intent.client_secret.ok_or(PaymentError::MissingClientSecret)
    }
}

/// POST /create-payment-intent
pub async fn create_payment_intent(
    processor: &dyn PaymentProcessor,
    request: CreatePaymentIntentRequest,
) -> AppResult<ClientSecretResponse> {
    request.validate()?;

    let client_secret = processor.create_intent(request.amount_in_cents).await?;
    Ok(ClientSecretResponse { client_secret })
}
