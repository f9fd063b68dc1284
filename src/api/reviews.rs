use actix_web::{web, HttpResponse};

use crate::models::{CreateReviewRequest, InsertResponse, MutationResponse, UpdateReviewRequest};
use crate::services::auth_service::VerifiedIdentity;
use crate::services::review_service;
use crate::state::AppState;
use crate::utils::error::AppResult;

#[utoipa::path(
    post,
    path = "/reviews",
    tag = "Reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review stored", body = InsertResponse),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_review(
    state: web::Data<AppState>,
    request: web::Json<CreateReviewRequest>,
) -> AppResult<HttpResponse> {
    let response = review_service::create_review(state.store.as_ref(), request.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

#[utoipa::path(
    get,
    path = "/reviews",
    tag = "Reviews",
    responses(
        (status = 200, description = "All reviews, newest first"),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_reviews(
    state: web::Data<AppState>,
    identity: web::ReqData<VerifiedIdentity>,
) -> AppResult<HttpResponse> {
    log::debug!("⭐ GET /reviews by {}", identity.subject);

    let reviews = review_service::list_reviews(state.store.as_ref()).await?;
    Ok(HttpResponse::Ok().json(reviews))
}

#[utoipa::path(
    get,
    path = "/reviews/{scholarship_id}",
    tag = "Reviews",
    params(("scholarship_id" = String, Path, description = "Scholarship id")),
    responses((status = 200, description = "Reviews of the scholarship"))
)]
pub async fn scholarship_reviews(
    state: web::Data<AppState>,
    scholarship_id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let reviews = review_service::reviews_for_scholarship(state.store.as_ref(), &scholarship_id).await?;
    Ok(HttpResponse::Ok().json(reviews))
}

#[utoipa::path(
    get,
    path = "/reviews/user/{email}",
    tag = "Reviews",
    params(("email" = String, Path, description = "Reviewer email")),
    responses((status = 200, description = "Reviews written by the user"))
)]
pub async fn user_reviews(
    state: web::Data<AppState>,
    email: web::Path<String>,
) -> AppResult<HttpResponse> {
    let reviews = review_service::reviews_by_user(state.store.as_ref(), &email).await?;
    Ok(HttpResponse::Ok().json(reviews))
}

#[utoipa::path(
    patch,
    path = "/reviews/{id}",
    tag = "Reviews",
    params(("id" = String, Path, description = "Review ObjectId")),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Update applied", body = MutationResponse),
        (status = 404, description = "No such review")
    )
)]
pub async fn update_review(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<UpdateReviewRequest>,
) -> AppResult<HttpResponse> {
    let response = review_service::update_review(state.store.as_ref(), &id, request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    delete,
    path = "/reviews/{id}",
    tag = "Reviews",
    params(("id" = String, Path, description = "Review ObjectId")),
    responses(
        (status = 200, description = "Review deleted", body = MutationResponse),
        (status = 404, description = "No such review")
    )
)]
pub async fn delete_review(state: web::Data<AppState>, id: web::Path<String>) -> AppResult<HttpResponse> {
    log::info!("🗑️  DELETE /reviews/{}", id);

    let response = review_service::delete_review(state.store.as_ref(), &id).await?;
    Ok(HttpResponse::Ok().json(response))
}
