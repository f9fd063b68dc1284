use mongodb::bson::{doc, DateTime};
use serde_json::Value;
use validator::Validate;

use super::{delete_result, parse_object_id, to_fields, update_result};
use crate::database::{documents, Collection, DocumentStore, StoreError};
use crate::models::{CreateUserRequest, InsertResponse, MutationResponse, Role, RoleResponse};
use crate::utils::error::AppResult;

const ENTITY: &str = "User";

/// Outcome of `create_user`; an existing email is not an error.
#[derive(Debug)]
pub enum CreateUserOutcome {
    Created(InsertResponse),
    AlreadyExists(InsertResponse),
}

/// Inserts the user unless the email is already registered.
///
/// Uniqueness is enforced by the `users(email)` unique index, so concurrent
/// sign-ups for the same email cannot both insert.
pub async fn create_user(
    store: &dyn DocumentStore,
    request: CreateUserRequest,
) -> AppResult<CreateUserOutcome> {
    request.validate()?;

    let mut fields = to_fields(&request)?;
    fields.insert("role", Role::User.as_str());
    fields.insert("createdAt", DateTime::now());

    match store.insert_one(Collection::Users, fields).await {
        Ok(id) => {
            log::info!("👤 User registered: {}", request.email);
            Ok(CreateUserOutcome::Created(InsertResponse::inserted(id.to_hex())))
        }
        Err(StoreError::DuplicateKey(_)) => {
            log::debug!("User already exists: {}", request.email);
            Ok(CreateUserOutcome::AlreadyExists(InsertResponse {
                acknowledged: false,
                inserted_id: None,
                message: Some("User already exists".to_string()),
            }))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn list_users(store: &dyn DocumentStore) -> AppResult<Vec<Value>> {
    let users = store.find(Collection::Users, doc! {}, None).await?;
    Ok(documents::to_json_list(users))
}

/// Stored role as-is, `"user"` when the user or the field is absent.
pub async fn get_role(store: &dyn DocumentStore, email: &str) -> AppResult<RoleResponse> {
    let user = store.find_one(Collection::Users, doc! { "email": email }).await?;

    let role = user
        .as_ref()
        .and_then(|u| u.get_str("role").ok())
        .unwrap_or(Role::User.as_str())
        .to_string();

    Ok(RoleResponse { role })
}

pub async fn set_role(store: &dyn DocumentStore, id: &str, role: Role) -> AppResult<MutationResponse> {
    let object_id = parse_object_id(id, "user")?;

    let outcome = store
        .update_one(Collection::Users, doc! { "_id": object_id }, doc! { "role": role.as_str() })
        .await?;

    if outcome.modified > 0 {
        log::info!("🛡️ User {} role -> {}", id, role);
    }
    update_result(ENTITY, outcome)
}

pub async fn delete_user(store: &dyn DocumentStore, id: &str) -> AppResult<MutationResponse> {
    let object_id = parse_object_id(id, "user")?;
    let deleted = store
        .delete_one(Collection::Users, doc! { "_id": object_id })
        .await?;
    delete_result(ENTITY, deleted)
}
