use actix_web::{web, HttpResponse};

use crate::models::{CreateUserRequest, InsertResponse, MutationResponse, RoleResponse, UpdateRoleRequest};
use crate::services::auth_service::VerifiedIdentity;
use crate::services::user_service::{self, CreateUserOutcome};
use crate::state::AppState;
use crate::utils::error::AppResult;

#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User registered", body = InsertResponse),
        (status = 200, description = "User already exists", body = InsertResponse)
    )
)]
pub async fn create_user(
    state: web::Data<AppState>,
    request: web::Json<CreateUserRequest>,
) -> AppResult<HttpResponse> {
    match user_service::create_user(state.store.as_ref(), request.into_inner()).await? {
        CreateUserOutcome::Created(response) => Ok(HttpResponse::Created().json(response)),
        CreateUserOutcome::AlreadyExists(response) => Ok(HttpResponse::Ok().json(response)),
    }
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    responses(
        (status = 200, description = "All users"),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token or not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    state: web::Data<AppState>,
    identity: web::ReqData<VerifiedIdentity>,
) -> AppResult<HttpResponse> {
    log::info!("👥 GET /users by {}", identity.email.as_deref().unwrap_or(&identity.subject));

    let users = user_service::list_users(state.store.as_ref()).await?;
    Ok(HttpResponse::Ok().json(users))
}

#[utoipa::path(
    get,
    path = "/users/{email}/role",
    tag = "Users",
    params(("email" = String, Path, description = "User email")),
    responses((status = 200, description = "Stored role, `user` by default", body = RoleResponse))
)]
pub async fn get_user_role(
    state: web::Data<AppState>,
    email: web::Path<String>,
) -> AppResult<HttpResponse> {
    let role = user_service::get_role(state.store.as_ref(), &email).await?;
    Ok(HttpResponse::Ok().json(role))
}

#[utoipa::path(
    patch,
    path = "/users/role/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ObjectId")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role written", body = MutationResponse),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "No such user")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user_role(
    state: web::Data<AppState>,
    identity: web::ReqData<VerifiedIdentity>,
    id: web::Path<String>,
    request: web::Json<UpdateRoleRequest>,
) -> AppResult<HttpResponse> {
    log::info!(
        "🛡️ PATCH /users/role/{} -> {} by {}",
        id,
        request.role,
        identity.email.as_deref().unwrap_or(&identity.subject)
    );

    let response = user_service::set_role(state.store.as_ref(), &id, request.role).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ObjectId")),
    responses(
        (status = 200, description = "User deleted", body = MutationResponse),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "No such user")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    state: web::Data<AppState>,
    identity: web::ReqData<VerifiedIdentity>,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    log::info!(
        "🗑️  DELETE /users/{} by {}",
        id,
        identity.email.as_deref().unwrap_or(&identity.subject)
    );

    let response = user_service::delete_user(state.store.as_ref(), &id).await?;
    Ok(HttpResponse::Ok().json(response))
}
