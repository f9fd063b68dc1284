use std::sync::Arc;

use crate::database::DocumentStore;
use crate::services::auth_service::IdentityVerifier;
use crate::services::payment_intent_service::PaymentProcessor;

/// Collaborators built once at start-up and shared by every worker.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub payments: Arc<dyn PaymentProcessor>,
}
