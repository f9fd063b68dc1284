use mongodb::bson::{doc, DateTime};
use serde_json::Value;
use validator::Validate;

use super::{delete_result, parse_object_id, to_fields, update_result};
use crate::database::{documents, Collection, DocumentStore, Sort};
use crate::models::{CreateReviewRequest, InsertResponse, MutationResponse, UpdateReviewRequest};
use crate::utils::error::{AppError, AppResult};

const ENTITY: &str = "Review";

pub async fn create_review(
    store: &dyn DocumentStore,
    request: CreateReviewRequest,
) -> AppResult<InsertResponse> {
    request.validate()?;

    let mut fields = to_fields(&request)?;
    fields.insert("createdAt", DateTime::now());

    let id = store.insert_one(Collection::Reviews, fields).await?;
    log::info!("⭐ Review {} by {} for {}", id, request.user_email, request.scholarship_id);
    Ok(InsertResponse::inserted(id.to_hex()))
}

pub async fn list_reviews(store: &dyn DocumentStore) -> AppResult<Vec<Value>> {
    let reviews = store
        .find(Collection::Reviews, doc! {}, Some(Sort::newest_first("createdAt")))
        .await?;
    Ok(documents::to_json_list(reviews))
}

pub async fn reviews_for_scholarship(
    store: &dyn DocumentStore,
    scholarship_id: &str,
) -> AppResult<Vec<Value>> {
    let reviews = store
        .find(
            Collection::Reviews,
            doc! { "scholarshipId": scholarship_id },
            Some(Sort::newest_first("createdAt")),
        )
        .await?;
    Ok(documents::to_json_list(reviews))
}

pub async fn reviews_by_user(store: &dyn DocumentStore, email: &str) -> AppResult<Vec<Value>> {
    let reviews = store
        .find(
            Collection::Reviews,
            doc! { "userEmail": email },
            Some(Sort::newest_first("createdAt")),
        )
        .await?;
    Ok(documents::to_json_list(reviews))
}

pub async fn update_review(
    store: &dyn DocumentStore,
    id: &str,
    request: UpdateReviewRequest,
) -> AppResult<MutationResponse> {
    let object_id = parse_object_id(id, "review")?;
    request.validate()?;

    let fields = to_fields(&request)?;
    if fields.is_empty() {
        return Err(AppError::InvalidRequest("No fields to update".to_string()));
    }

    let outcome = store
        .update_one(Collection::Reviews, doc! { "_id": object_id }, fields)
        .await?;
    update_result(ENTITY, outcome)
}

pub async fn delete_review(store: &dyn DocumentStore, id: &str) -> AppResult<MutationResponse> {
    let object_id = parse_object_id(id, "review")?;
    let deleted = store
        .delete_one(Collection::Reviews, doc! { "_id": object_id })
        .await?;
    delete_result(ENTITY, deleted)
}
