use actix_web::{web, HttpResponse};

use crate::models::{
    AlreadyAppliedQuery, AlreadyAppliedResponse, CreateApplicationRequest, EmailQuery,
    InsertResponse, MutationResponse, UpdateApplicationRequest, UpdateStatusRequest,
};
use crate::services::application_service;
use crate::services::auth_service::VerifiedIdentity;
use crate::state::AppState;
use crate::utils::error::AppResult;

#[utoipa::path(
    post,
    path = "/applications",
    tag = "Applications",
    request_body = CreateApplicationRequest,
    responses(
        (status = 201, description = "Application submitted", body = InsertResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Already applied to this scholarship")
    )
)]
pub async fn create_application(
    state: web::Data<AppState>,
    request: web::Json<CreateApplicationRequest>,
) -> AppResult<HttpResponse> {
    log::info!(
        "📝 POST /applications - {} -> {}",
        request.user_email,
        request.scholarship_id
    );

    let response = application_service::create_application(state.store.as_ref(), request.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

#[utoipa::path(
    get,
    path = "/applications",
    tag = "Applications",
    params(("email" = Option<String>, Query, description = "Only applications of this applicant")),
    responses(
        (status = 200, description = "Applications, newest first"),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_applications(
    state: web::Data<AppState>,
    identity: web::ReqData<VerifiedIdentity>,
    query: web::Query<EmailQuery>,
) -> AppResult<HttpResponse> {
    log::debug!("📋 GET /applications by {} filter={:?}", identity.subject, query.email);

    let applications =
        application_service::list_applications(state.store.as_ref(), query.email.as_deref()).await?;
    Ok(HttpResponse::Ok().json(applications))
}

#[utoipa::path(
    get,
    path = "/applications/user/{email}",
    tag = "Applications",
    params(("email" = String, Path, description = "Applicant email")),
    responses((status = 200, description = "Applications of the user, newest first"))
)]
pub async fn list_user_applications(
    state: web::Data<AppState>,
    email: web::Path<String>,
) -> AppResult<HttpResponse> {
    let applications = application_service::list_applications(state.store.as_ref(), Some(&email)).await?;
    Ok(HttpResponse::Ok().json(applications))
}

#[utoipa::path(
    get,
    path = "/applications/check",
    tag = "Applications",
    params(
        ("email" = String, Query, description = "Applicant email"),
        ("scholarshipId" = String, Query, description = "Scholarship id")
    ),
    responses((status = 200, description = "Whether the pair exists", body = AlreadyAppliedResponse))
)]
pub async fn check_already_applied(
    state: web::Data<AppState>,
    query: web::Query<AlreadyAppliedQuery>,
) -> AppResult<HttpResponse> {
    let already_applied =
        application_service::already_applied(state.store.as_ref(), &query.email, &query.scholarship_id).await?;
    Ok(HttpResponse::Ok().json(AlreadyAppliedResponse { already_applied }))
}

#[utoipa::path(
    put,
    path = "/applications/{id}",
    tag = "Applications",
    params(("id" = String, Path, description = "Application ObjectId")),
    request_body = UpdateApplicationRequest,
    responses(
        (status = 200, description = "Update applied", body = MutationResponse),
        (status = 404, description = "No such application")
    )
)]
pub async fn update_application(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<UpdateApplicationRequest>,
) -> AppResult<HttpResponse> {
    log::info!("🔧 PUT /applications/{}", id);

    let response =
        application_service::update_application(state.store.as_ref(), &id, request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    patch,
    path = "/applications/cancel/{id}",
    tag = "Applications",
    params(("id" = String, Path, description = "Application ObjectId")),
    responses(
        (status = 200, description = "Cancelled (success=false when already cancelled)", body = MutationResponse),
        (status = 404, description = "No such application")
    )
)]
pub async fn cancel_application(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    log::info!("❌ PATCH /applications/cancel/{}", id);

    let response = application_service::cancel_application(state.store.as_ref(), &id).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    patch,
    path = "/applications/status/{id}",
    tag = "Applications",
    params(("id" = String, Path, description = "Application ObjectId")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status written (success=false when unchanged)", body = MutationResponse),
        (status = 404, description = "No such application")
    )
)]
pub async fn update_application_status(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<UpdateStatusRequest>,
) -> AppResult<HttpResponse> {
    log::info!("🔄 PATCH /applications/status/{} -> {}", id, request.status.as_str());

    let response =
        application_service::set_application_status(state.store.as_ref(), &id, request.status).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    delete,
    path = "/applications/{id}",
    tag = "Applications",
    params(("id" = String, Path, description = "Application ObjectId")),
    responses(
        (status = 200, description = "Application deleted", body = MutationResponse),
        (status = 404, description = "No such application")
    )
)]
pub async fn delete_application(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    log::info!("🗑️  DELETE /applications/{}", id);

    let response = application_service::delete_application(state.store.as_ref(), &id).await?;
    Ok(HttpResponse::Ok().json(response))
}
