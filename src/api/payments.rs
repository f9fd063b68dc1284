use actix_web::{web, HttpResponse};

use crate::models::{
    ClientSecretResponse, CreatePaymentIntentRequest, EmailQuery, PaymentRecordedResponse,
    RecordPaymentRequest,
};
use crate::services::auth_service::VerifiedIdentity;
use crate::services::{payment_intent_service, payment_service};
use crate::state::AppState;
use crate::utils::error::AppResult;

#[utoipa::path(
    post,
    path = "/create-payment-intent",
    tag = "Payments",
    request_body = CreatePaymentIntentRequest,
    responses(
        (status = 200, description = "Intent created", body = ClientSecretResponse),
        (status = 500, description = "Failed to create payment intent")
    )
)]
pub async fn create_payment_intent(
    state: web::Data<AppState>,
    request: web::Json<CreatePaymentIntentRequest>,
) -> AppResult<HttpResponse> {
    let response =
        payment_intent_service::create_payment_intent(state.payments.as_ref(), request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    post,
    path = "/payments",
    tag = "Payments",
    request_body = RecordPaymentRequest,
    responses(
        (status = 201, description = "Payment recorded", body = PaymentRecordedResponse),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn record_payment(
    state: web::Data<AppState>,
    request: web::Json<RecordPaymentRequest>,
) -> AppResult<HttpResponse> {
    let response = payment_service::record_payment(state.store.as_ref(), request.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

#[utoipa::path(
    get,
    path = "/payments",
    tag = "Payments",
    params(("email" = Option<String>, Query, description = "Only payments of this payer")),
    responses(
        (status = 200, description = "Payment history, latest first"),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_payments(
    state: web::Data<AppState>,
    identity: web::ReqData<VerifiedIdentity>,
    query: web::Query<EmailQuery>,
) -> AppResult<HttpResponse> {
    log::debug!("💳 GET /payments by {} filter={:?}", identity.subject, query.email);

    let payments = payment_service::list_payments(state.store.as_ref(), query.email.as_deref()).await?;
    Ok(HttpResponse::Ok().json(payments))
}
