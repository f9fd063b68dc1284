//! Shared fixtures for unit and HTTP tests.

use std::sync::Arc;

use actix_web::web;
use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};
use mongodb::bson::doc;
use serde_json::json;

use crate::database::{Collection, DocumentStore, MemoryStore};
use crate::services::auth_service::JwtVerifier;
use crate::services::payment_intent_service::{PaymentError, PaymentProcessor};
use crate::state::AppState;

pub const TEST_SECRET: &[u8] = b"scholarship-test-secret";
pub const TEST_PROJECT: &str = "scholar-test";
pub const TEST_ISSUER: &str = "https://securetoken.google.com/scholar-test";

pub struct FakeProcessor;

#[async_trait]
impl PaymentProcessor for FakeProcessor {
    async fn create_intent(&self, amount_in_cents: i64) -> Result<String, PaymentError> {
        Ok(format!("pi_{}_secret_test", amount_in_cents))
    }
}

pub struct FailingProcessor;

#[async_trait]
impl PaymentProcessor for FailingProcessor {
    async fn create_intent(&self, _amount_in_cents: i64) -> Result<String, PaymentError> {
        Err(PaymentError::Rejected {
            status: 402,
            message: "Your card was declined.".to_string(),
        })
    }
}

/// App state over a fresh in-memory store; the store handle is returned for seeding.
pub fn test_state() -> (web::Data<AppState>, Arc<MemoryStore>) {
    test_state_with(Arc::new(FakeProcessor))
}

pub fn test_state_with(payments: Arc<dyn PaymentProcessor>) -> (web::Data<AppState>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState {
        store: store.clone(),
        verifier: Arc::new(JwtVerifier::with_secret(TEST_SECRET, TEST_ISSUER, TEST_PROJECT)),
        payments,
    };
    (web::Data::new(state), store)
}

fn sign(email: &str, exp_offset: i64, email_verified: bool) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = json!({
        "sub": format!("uid-{}", email),
        "email": email,
        "email_verified": email_verified,
        "iat": now,
        "exp": now + exp_offset,
        "iss": TEST_ISSUER,
        "aud": TEST_PROJECT,
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(TEST_SECRET)).unwrap()
}

pub fn token_for(email: &str) -> String {
    sign(email, 3600, true)
}

pub fn expired_token_for(email: &str) -> String {
    sign(email, -3600, true)
}

pub fn unverified_token_for(email: &str) -> String {
    sign(email, 3600, false)
}

pub async fn seed_user(store: &MemoryStore, email: &str, role: &str) {
    store
        .insert_one(Collection::Users, doc! { "email": email, "role": role })
        .await
        .unwrap();
}

/// Full app (gate + routes) over the given `web::Data<AppState>`.
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .wrap(crate::middleware::AuthGate)
                .configure(crate::api::configure),
        )
        .await
    };
}

pub(crate) use test_app;
