use actix_web::{web, HttpResponse};

use crate::models::{CreateScholarshipRequest, InsertResponse, MutationResponse, UpdateScholarshipRequest};
use crate::services::scholarship_service;
use crate::state::AppState;
use crate::utils::error::AppResult;

#[utoipa::path(
    get,
    path = "/scholarships",
    tag = "Scholarships",
    responses((status = 200, description = "All scholarships"))
)]
pub async fn list_scholarships(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let scholarships = scholarship_service::list_scholarships(state.store.as_ref()).await?;
    Ok(HttpResponse::Ok().json(scholarships))
}

#[utoipa::path(
    get,
    path = "/scholarships/{id}",
    tag = "Scholarships",
    params(("id" = String, Path, description = "Scholarship ObjectId")),
    responses(
        (status = 200, description = "The scholarship"),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "No such scholarship")
    )
)]
pub async fn get_scholarship(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let scholarship = scholarship_service::get_scholarship(state.store.as_ref(), &id).await?;
    Ok(HttpResponse::Ok().json(scholarship))
}

#[utoipa::path(
    post,
    path = "/scholarships",
    tag = "Scholarships",
    request_body = CreateScholarshipRequest,
    responses(
        (status = 201, description = "Scholarship created", body = InsertResponse),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_scholarship(
    state: web::Data<AppState>,
    request: web::Json<CreateScholarshipRequest>,
) -> AppResult<HttpResponse> {
    log::info!("🎓 POST /scholarships - {}", request.title);

    let response = scholarship_service::create_scholarship(state.store.as_ref(), request.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

#[utoipa::path(
    put,
    path = "/scholarships/{id}",
    tag = "Scholarships",
    params(("id" = String, Path, description = "Scholarship ObjectId")),
    request_body = UpdateScholarshipRequest,
    responses(
        (status = 200, description = "Update applied (success=false when nothing changed)", body = MutationResponse),
        (status = 404, description = "No such scholarship")
    )
)]
pub async fn update_scholarship(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<UpdateScholarshipRequest>,
) -> AppResult<HttpResponse> {
    log::info!("🔧 PUT /scholarships/{}", id);

    let response =
        scholarship_service::update_scholarship(state.store.as_ref(), &id, request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    delete,
    path = "/scholarships/{id}",
    tag = "Scholarships",
    params(("id" = String, Path, description = "Scholarship ObjectId")),
    responses(
        (status = 200, description = "Scholarship deleted", body = MutationResponse),
        (status = 404, description = "No such scholarship")
    )
)]
pub async fn delete_scholarship(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    log::info!("🗑️  DELETE /scholarships/{}", id);

    let response = scholarship_service::delete_scholarship(state.store.as_ref(), &id).await?;
    Ok(HttpResponse::Ok().json(response))
}
