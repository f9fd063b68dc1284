use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, AUTHORIZATION},
    web, Error, HttpMessage, ResponseError,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

use super::policy::{self, Access};
use crate::models::Role;
use crate::services::auth_service::VerifiedIdentity;
use crate::services::user_service;
use crate::state::AppState;
use crate::utils::error::AppError;

/// Authorization gate for the whole app.
///
/// Looks up the route in the policy table; for guarded routes it requires a
/// verified bearer token (and a role where the table says so) and attaches
/// the [`VerifiedIdentity`] to the request.
pub struct AuthGate;

impl<S, B> Transform<S, ServiceRequest> for AuthGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGateService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGateService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthGateService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Classify on the decoded path the router matches, not the raw URI
        let access = policy::required_access(req.method(), req.match_info().as_str());

        if access == Access::Public {
            let fut = self.service.call(req);
            return Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) });
        }

        let service = Rc::clone(&self.service);
        Box::pin(async move {
            match authorize(&req, access).await {
                Ok(identity) => {
                    req.extensions_mut().insert(identity);
                    service.call(req).await.map(ServiceResponse::map_into_left_body)
                }
                Err(e) => {
                    let response = e.error_response();
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

/// `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

async fn authorize(req: &ServiceRequest, access: Access) -> Result<VerifiedIdentity, AppError> {
    let token = bearer_token(req.headers()).ok_or_else(|| {
        log::warn!("🔒 {} {} rejected: missing bearer token", req.method(), req.path());
        AppError::Unauthenticated
    })?;

    let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
        log::error!("❌ AppState not registered, cannot verify tokens");
        AppError::Forbidden("Authorization unavailable".to_string())
    })?;

    let identity = state.verifier.verify(token).await.map_err(|e| {
        log::warn!("🔒 {} {} rejected: {}", req.method(), req.path(), e);
        AppError::Forbidden("Invalid or expired token".to_string())
    })?;

    if let Access::Role(required) = access {
        let email = identity
            .email
            .as_deref()
            .ok_or_else(|| AppError::Forbidden("Token carries no email".to_string()))?;

        if !identity.email_verified {
            log::warn!("🔒 {} {} rejected: email {} not verified", req.method(), req.path(), email);
            return Err(AppError::Forbidden("Email not verified".to_string()));
        }

        let role = user_service::get_role(state.store.as_ref(), email).await?.role;
        let granted = role
            .parse::<Role>()
            .map(|role| role.satisfies(required))
            .unwrap_or(false);

        if !granted {
            log::warn!(
                "🔒 {} {} rejected: {} has role '{}', needs '{}'",
                req.method(),
                req.path(),
                email,
                role,
                required
            );
            return Err(AppError::Forbidden(format!("{} role required", required)));
        }
    }

    Ok(identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        expired_token_for, seed_user, test_app, test_state, token_for, unverified_token_for,
    };
    use crate::database::{Collection, DocumentStore};
    use actix_web::http::Method;
    use actix_web::http::{header::HeaderValue, StatusCode};
    use actix_web::test::{call_service, TestRequest};

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[actix_web::test]
    async fn test_missing_token_is_unauthenticated() {
        let (state, _) = test_state();
        let app = test_app!(state);

        let resp = call_service(&app, TestRequest::get().uri("/reviews").to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_invalid_or_expired_token_is_forbidden() {
        let (state, _) = test_state();
        let app = test_app!(state);

        for token in ["garbage".to_string(), expired_token_for("a@b.com")] {
            let req = TestRequest::get()
                .uri("/payments")
                .insert_header((AUTHORIZATION, format!("Bearer {}", token)))
                .to_request();
            let resp = call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        }
    }

    #[actix_web::test]
    async fn test_valid_token_passes_authenticated_route() {
        let (state, _) = test_state();
        let app = test_app!(state);

        let req = TestRequest::get()
            .uri("/reviews")
            .insert_header((AUTHORIZATION, format!("Bearer {}", token_for("a@b.com"))))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_admin_routes_need_admin_role() {
        let (state, store) = test_state();
        seed_user(&store, "user@b.com", "user").await;
        seed_user(&store, "boss@b.com", "admin").await;
        let app = test_app!(state);

        let as_user = TestRequest::get()
            .uri("/users")
            .insert_header((AUTHORIZATION, format!("Bearer {}", token_for("user@b.com"))))
            .to_request();
        assert_eq!(call_service(&app, as_user).await.status(), StatusCode::FORBIDDEN);

        let unknown = TestRequest::get()
            .uri("/users")
            .insert_header((AUTHORIZATION, format!("Bearer {}", token_for("ghost@b.com"))))
            .to_request();
        assert_eq!(call_service(&app, unknown).await.status(), StatusCode::FORBIDDEN);

        let as_admin = TestRequest::get()
            .uri("/users")
            .insert_header((AUTHORIZATION, format!("Bearer {}", token_for("boss@b.com"))))
            .to_request();
        assert_eq!(call_service(&app, as_admin).await.status(), StatusCode::OK);
    }

    const USER_ID: &str = "65f1c0ffee00000000000001";

    /// One request per guarded row of the policy table.
    fn guarded_routes() -> Vec<(Method, String)> {
        vec![
            (Method::GET, "/applications".to_string()),
            (Method::GET, "/reviews".to_string()),
            (Method::GET, "/payments".to_string()),
            (Method::GET, "/users".to_string()),
            (Method::PATCH, format!("/users/role/{}", USER_ID)),
            (Method::DELETE, format!("/users/{}", USER_ID)),
        ]
    }

    fn request(method: &Method, uri: &str) -> TestRequest {
        let req = TestRequest::default().method(method.clone()).uri(uri);
        if *method == Method::PATCH {
            req.set_json(serde_json::json!({ "role": "moderator" }))
        } else {
            req
        }
    }

    #[actix_web::test]
    async fn test_every_guarded_route_needs_a_valid_token() {
        let (state, _) = test_state();
        let app = test_app!(state);

        for (method, uri) in guarded_routes() {
            let resp = call_service(&app, request(&method, &uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);

            let req = request(&method, &uri)
                .insert_header((AUTHORIZATION, "Bearer garbage"))
                .to_request();
            let resp = call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{} {}", method, uri);
        }
    }

    #[actix_web::test]
    async fn test_percent_encoded_paths_are_still_guarded() {
        let (state, store) = test_state();
        store
            .insert_one(
                Collection::Payments,
                mongodb::bson::doc! { "userEmail": "victim@b.com", "transactionId": "pi_1" },
            )
            .await
            .unwrap();
        let app = test_app!(state);

        let encoded = [
            (Method::GET, "/application%73".to_string()),
            (Method::GET, "/review%73".to_string()),
            (Method::GET, "/payment%73".to_string()),
            (Method::GET, "/%70ayments".to_string()),
            (Method::GET, "/user%73".to_string()),
            (Method::PATCH, format!("/users/%72ole/{}", USER_ID)),
            (Method::DELETE, format!("/user%73/{}", USER_ID)),
        ];

        for (method, uri) in encoded {
            let resp = call_service(&app, request(&method, &uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        }
    }

    #[actix_web::test]
    async fn test_admin_rows_reject_plain_users() {
        let (state, store) = test_state();
        seed_user(&store, "user@b.com", "user").await;
        let app = test_app!(state);

        for (method, uri) in guarded_routes().into_iter().skip(3) {
            let req = request(&method, &uri)
                .insert_header((AUTHORIZATION, format!("Bearer {}", token_for("user@b.com"))))
                .to_request();
            let resp = call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{} {}", method, uri);
        }
    }

    #[actix_web::test]
    async fn test_admin_with_unverified_email_is_forbidden() {
        let (state, store) = test_state();
        seed_user(&store, "boss@b.com", "admin").await;
        let app = test_app!(state);

        let req = TestRequest::get()
            .uri("/users")
            .insert_header((AUTHORIZATION, format!("Bearer {}", unverified_token_for("boss@b.com"))))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_public_routes_ignore_missing_token() {
        let (state, _) = test_state();
        let app = test_app!(state);

        let resp = call_service(&app, TestRequest::get().uri("/scholarships").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
