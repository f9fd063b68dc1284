pub mod applications;
pub mod health;
pub mod payments;
pub mod reviews;
pub mod scholarships;
pub mod swagger;
pub mod users;

use actix_web::{error, web, HttpRequest};

use crate::utils::error::AppError;

/// Rejected bodies, queries and paths answer with the same `{success, error}` shape as handler errors.
fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::InvalidRequest(err.to_string()).into()
}

fn query_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::InvalidRequest(err.to_string()).into()
}

fn path_error(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::InvalidRequest(err.to_string()).into()
}

/// Registers every route. The authorization gate is applied by the caller around the whole app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .route("/", web::get().to(health::liveness))
        .route("/health", web::get().to(health::health_check))
        // ==================== SCHOLARSHIPS ====================
        .service(
            web::scope("/scholarships")
                .route("", web::get().to(scholarships::list_scholarships))
                .route("", web::post().to(scholarships::create_scholarship))
                .route("/{id}", web::get().to(scholarships::get_scholarship))
                .route("/{id}", web::put().to(scholarships::update_scholarship))
                .route("/{id}", web::delete().to(scholarships::delete_scholarship)),
        )
        // ==================== APPLICATIONS ====================
        .service(
            web::scope("/applications")
                .route("", web::post().to(applications::create_application))
                .route("", web::get().to(applications::list_applications))
                .route("/check", web::get().to(applications::check_already_applied))
                .route("/user/{email}", web::get().to(applications::list_user_applications))
                .route("/cancel/{id}", web::patch().to(applications::cancel_application))
                .route("/status/{id}", web::patch().to(applications::update_application_status))
                .route("/{id}", web::put().to(applications::update_application))
                .route("/{id}", web::delete().to(applications::delete_application)),
        )
        // ==================== REVIEWS ====================
        .service(
            web::scope("/reviews")
                .route("", web::post().to(reviews::create_review))
                .route("", web::get().to(reviews::list_reviews))
                .route("/user/{email}", web::get().to(reviews::user_reviews))
                .route("/{scholarship_id}", web::get().to(reviews::scholarship_reviews))
                .route("/{id}", web::patch().to(reviews::update_review))
                .route("/{id}", web::delete().to(reviews::delete_review)),
        )
        // ==================== USERS ====================
        .service(
            web::scope("/users")
                .route("", web::post().to(users::create_user))
                .route("", web::get().to(users::list_users))
                .route("/role/{id}", web::patch().to(users::update_user_role))
                // Path used by existing web clients
                .route("/role/{email}", web::get().to(users::get_user_role))
                .route("/{email}/role", web::get().to(users::get_user_role))
                .route("/{id}", web::delete().to(users::delete_user)),
        )
        // ==================== PAYMENTS ====================
        .route("/create-payment-intent", web::post().to(payments::create_payment_intent))
        .service(
            web::scope("/payments")
                .route("", web::post().to(payments::record_payment))
                .route("", web::get().to(payments::list_payments)),
        );
}
