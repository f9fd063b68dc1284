use mongodb::bson::doc;
use serde_json::Value;
use validator::Validate;

use super::{delete_result, parse_object_id, to_fields, update_result};
use crate::database::{documents, Collection, DocumentStore};
use crate::models::{CreateScholarshipRequest, InsertResponse, MutationResponse, UpdateScholarshipRequest};
use crate::utils::error::{AppError, AppResult};

const ENTITY: &str = "Scholarship";

pub async fn list_scholarships(store: &dyn DocumentStore) -> AppResult<Vec<Value>> {
    let scholarships = store.find(Collection::Scholarships, doc! {}, None).await?;
    Ok(documents::to_json_list(scholarships))
}

pub async fn get_scholarship(store: &dyn DocumentStore, id: &str) -> AppResult<Value> {
    let object_id = parse_object_id(id, "scholarship")?;

    store
        .find_one(Collection::Scholarships, doc! { "_id": object_id })
        .await?
        .map(documents::to_json)
        .ok_or_else(|| AppError::NotFound(format!("{} not found", ENTITY)))
}

pub async fn create_scholarship(
    store: &dyn DocumentStore,
    request: CreateScholarshipRequest,
) -> AppResult<InsertResponse> {
    request.validate()?;

    let id = store
        .insert_one(Collection::Scholarships, to_fields(&request)?)
        .await?;

    log::info!("🎓 Scholarship created: {} ({})", request.title, id);
    Ok(InsertResponse::inserted(id.to_hex()))
}

pub async fn update_scholarship(
    store: &dyn DocumentStore,
    id: &str,
    request: UpdateScholarshipRequest,
) -> AppResult<MutationResponse> {
    let object_id = parse_object_id(id, "scholarship")?;
    request.validate()?;

    let fields = to_fields(&request)?;
    if fields.is_empty() {
        return Err(AppError::InvalidRequest("No fields to update".to_string()));
    }

    let outcome = store
        .update_one(Collection::Scholarships, doc! { "_id": object_id }, fields)
        .await?;
    update_result(ENTITY, outcome)
}

/// Applications and reviews referencing the scholarship are left in place.
pub async fn delete_scholarship(store: &dyn DocumentStore, id: &str) -> AppResult<MutationResponse> {
    let object_id = parse_object_id(id, "scholarship")?;
    let deleted = store
        .delete_one(Collection::Scholarships, doc! { "_id": object_id })
        .await?;
    delete_result(ENTITY, deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use serde_json::json;

    fn stem_grant() -> CreateScholarshipRequest {
        serde_json::from_value(json!({ "title": "STEM Grant", "amount": 5000.0 })).unwrap()
    }

    #[tokio::test]
    async fn test_create_then_get_returns_same_document_plus_id() {
        let store = MemoryStore::new();
        let created = create_scholarship(&store, stem_grant()).await.unwrap();
        let id = created.inserted_id.unwrap();

        let fetched = get_scholarship(&store, &id).await.unwrap();

        assert_eq!(fetched, json!({ "_id": id, "title": "STEM Grant", "amount": 5000.0 }));
    }

    #[tokio::test]
    async fn test_undeclared_fields_and_integer_amounts_are_kept() {
        let store = MemoryStore::new();
        let submitted = json!({
            "title": "STEM Grant",
            "amount": 5000,
            "applicationFee": 25.5,
            "scholarshipCategory": "Full fund",
            "subjects": ["Physics", "Maths"],
        });
        let request: CreateScholarshipRequest = serde_json::from_value(submitted.clone()).unwrap();

        let id = create_scholarship(&store, request).await.unwrap().inserted_id.unwrap();
        let fetched = get_scholarship(&store, &id).await.unwrap();

        let mut expected = submitted;
        expected["_id"] = json!(id);
        assert_eq!(fetched, expected);
        assert!(fetched["amount"].is_u64());
    }

    #[tokio::test]
    async fn test_reserved_and_negative_fields_are_rejected() {
        let store = MemoryStore::new();

        for body in [
            json!({ "title": "STEM Grant", "_id": "65f1c0ffee00000000000001" }),
            json!({ "title": "STEM Grant", "$where": "1" }),
            json!({ "title": "STEM Grant", "award.total": 10 }),
            json!({ "title": "STEM Grant", "amount": -1 }),
        ] {
            let request: CreateScholarshipRequest = serde_json::from_value(body).unwrap();
            let result = create_scholarship(&store, request).await;
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
        assert!(list_scholarships(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_can_set_undeclared_fields() {
        let store = MemoryStore::new();
        let id = create_scholarship(&store, stem_grant()).await.unwrap().inserted_id.unwrap();

        let update: UpdateScholarshipRequest =
            serde_json::from_value(json!({ "scholarshipCategory": "Partial" })).unwrap();
        assert!(update_scholarship(&store, &id, update).await.unwrap().success);

        let fetched = get_scholarship(&store, &id).await.unwrap();
        assert_eq!(fetched["scholarshipCategory"], "Partial");
    }

    #[tokio::test]
    async fn test_create_requires_title() {
        let store = MemoryStore::new();
        let request: CreateScholarshipRequest = serde_json::from_value(json!({ "title": "" })).unwrap();

        let result = create_scholarship(&store, request).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(list_scholarships(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_merges_only_present_fields() {
        let store = MemoryStore::new();
        let id = create_scholarship(&store, stem_grant()).await.unwrap().inserted_id.unwrap();

        let update = UpdateScholarshipRequest {
            deadline: Some("2025-12-31".to_string()),
            ..Default::default()
        };
        let response = update_scholarship(&store, &id, update).await.unwrap();
        assert!(response.success);

        let fetched = get_scholarship(&store, &id).await.unwrap();
        assert_eq!(fetched["title"], "STEM Grant");
        assert_eq!(fetched["amount"], 5000.0);
        assert_eq!(fetched["deadline"], "2025-12-31");
    }

    #[tokio::test]
    async fn test_empty_update_is_rejected() {
        let store = MemoryStore::new();
        let id = create_scholarship(&store, stem_grant()).await.unwrap().inserted_id.unwrap();

        let result = update_scholarship(&store, &id, UpdateScholarshipRequest::default()).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_get_missing_and_invalid_ids() {
        let store = MemoryStore::new();

        let missing = get_scholarship(&store, &mongodb::bson::oid::ObjectId::new().to_hex()).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));

        let invalid = get_scholarship(&store, "123").await;
        assert!(matches!(invalid, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let store = MemoryStore::new();
        let id = create_scholarship(&store, stem_grant()).await.unwrap().inserted_id.unwrap();

        assert_eq!(delete_scholarship(&store, &id).await.unwrap().deleted_count, Some(1));
        assert!(matches!(delete_scholarship(&store, &id).await, Err(AppError::NotFound(_))));
    }
}
