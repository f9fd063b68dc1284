pub mod application_service;
pub mod auth_service;
pub mod payment_intent_service;
pub mod payment_service;
pub mod review_service;
pub mod scholarship_service;
pub mod user_service;

use mongodb::bson::{oid::ObjectId, Document};
use serde::Serialize;

use crate::database::UpdateOutcome;
use crate::models::MutationResponse;
use crate::utils::error::{AppError, AppResult};

pub fn parse_object_id(id: &str, entity: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| AppError::InvalidRequest(format!("Invalid {} ID", entity)))
}

/// Serializes a request payload into the fields to store.
pub fn to_fields<T: Serialize>(payload: &T) -> AppResult<Document> {
    mongodb::bson::to_document(payload)
        .map_err(|e| AppError::InvalidRequest(format!("Unsupported field value: {}", e)))
}

/// Zero matched documents is a not-found outcome, never success.
pub fn update_result(entity: &str, outcome: UpdateOutcome) -> AppResult<MutationResponse> {
    if outcome.matched == 0 {
        return Err(AppError::NotFound(format!("{} not found", entity)));
    }
    Ok(MutationResponse::updated(entity, outcome))
}

pub fn delete_result(entity: &str, deleted: u64) -> AppResult<MutationResponse> {
    if deleted == 0 {
        return Err(AppError::NotFound(format!("{} not found", entity)));
    }
    Ok(MutationResponse::deleted(entity, deleted))
}
