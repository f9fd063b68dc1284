use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Discriminator stored on every payment record.
pub const PAYMENT_TYPE: &str = "scholarship";

/// Body of `POST /payments`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentRequest {
    #[validate(length(min = 1))]
    pub scholarship_id: String,
    #[validate(email)]
    pub user_email: String,
    #[validate(range(exclusive_min = 0.0))]
    pub amount: f64,
    #[validate(length(min = 1))]
    pub transaction_id: String,
    pub payment_method: Option<String>,
    /// Defaults to the time the record is stored
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecordedResponse {
    pub message: String,
    pub inserted_id: String,
}

/// Body of `POST /create-payment-intent`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentRequest {
    /// Amount in the processor's minor unit, e.g. 5000 for $50.00
    #[validate(range(min = 1))]
    pub amount_in_cents: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientSecretResponse {
    pub client_secret: String,
}
