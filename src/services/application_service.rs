use mongodb::bson::{doc, DateTime, Document};
use serde_json::Value;
use validator::Validate;

use super::{delete_result, parse_object_id, to_fields, update_result};
use crate::database::{documents, Collection, DocumentStore, Sort, StoreError};
use crate::models::{
    ApplicationStatus, CreateApplicationRequest, InsertResponse, MutationResponse,
    UpdateApplicationRequest,
};
use crate::utils::error::{AppError, AppResult};

const ENTITY: &str = "Application";

/// Inserts a new application with status `applied` unless one was given.
///
/// A second application for the same (userEmail, scholarshipId) pair is
/// refused by the unique index and reported as a conflict.
pub async fn create_application(
    store: &dyn DocumentStore,
    request: CreateApplicationRequest,
) -> AppResult<InsertResponse> {
    request.validate()?;

    let mut fields = to_fields(&request)?;
    if !fields.contains_key("status") {
        fields.insert("status", ApplicationStatus::Applied.as_str());
    }
    let now = DateTime::now();
    fields.insert("createdAt", now);
    fields.insert("updatedAt", now);

    match store.insert_one(Collection::Applications, fields).await {
        Ok(id) => {
            log::info!(
                "📝 Application {} created: {} -> {}",
                id,
                request.user_email,
                request.scholarship_id
            );
            Ok(InsertResponse::inserted(id.to_hex()))
        }
        Err(StoreError::DuplicateKey(_)) => {
            log::warn!(
                "⚠️ Duplicate application: {} -> {}",
                request.user_email,
                request.scholarship_id
            );
            Err(AppError::Conflict("Already applied to this scholarship".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// All applications, or those of one applicant, newest first.
pub async fn list_applications(
    store: &dyn DocumentStore,
    email: Option<&str>,
) -> AppResult<Vec<Value>> {
    let filter = match email {
        Some(email) => doc! { "userEmail": email },
        None => Document::new(),
    };

    let applications = store
        .find(Collection::Applications, filter, Some(Sort::newest_first("createdAt")))
        .await?;
    Ok(documents::to_json_list(applications))
}

/// Exact string match on both fields.
pub async fn already_applied(
    store: &dyn DocumentStore,
    email: &str,
    scholarship_id: &str,
) -> AppResult<bool> {
    let existing = store
        .find_one(
            Collection::Applications,
            doc! { "userEmail": email, "scholarshipId": scholarship_id },
        )
        .await?;
    Ok(existing.is_some())
}

pub async fn update_application(
    store: &dyn DocumentStore,
    id: &str,
    request: UpdateApplicationRequest,
) -> AppResult<MutationResponse> {
    let object_id = parse_object_id(id, "application")?;
    request.validate()?;

    let mut fields = to_fields(&request)?;
    if fields.is_empty() {
        return Err(AppError::InvalidRequest("No fields to update".to_string()));
    }
    fields.insert("updatedAt", DateTime::now());

    let outcome = store
        .update_one(Collection::Applications, doc! { "_id": object_id }, fields)
        .await?;
    update_result(ENTITY, outcome)
}

/// Only `status` is written, so setting the current value reports no change.
pub async fn set_application_status(
    store: &dyn DocumentStore,
    id: &str,
    status: ApplicationStatus,
) -> AppResult<MutationResponse> {
    let object_id = parse_object_id(id, "application")?;

    let outcome = store
        .update_one(
            Collection::Applications,
            doc! { "_id": object_id },
            doc! { "status": status.as_str() },
        )
        .await?;

    if outcome.modified > 0 {
        log::info!("🔄 Application {} status -> {}", id, status.as_str());
    }
    update_result(ENTITY, outcome)
}

pub async fn cancel_application(store: &dyn DocumentStore, id: &str) -> AppResult<MutationResponse> {
    set_application_status(store, id, ApplicationStatus::Cancelled).await
}

pub async fn delete_application(store: &dyn DocumentStore, id: &str) -> AppResult<MutationResponse> {
    let object_id = parse_object_id(id, "application")?;
    let deleted = store
        .delete_one(Collection::Applications, doc! { "_id": object_id })
        .await?;
    delete_result(ENTITY, deleted)
}
