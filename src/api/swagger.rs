use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Scholarship Management System API",
        version = "1.0.0",
        description = "Backend for the scholarship portal: scholarships, applications, reviews, users and payments.\n\n**Authentication:** listing applications, reviews and payments needs an identity-provider ID token as Bearer. User management needs the admin role."
    ),
    paths(
        // Health
        crate::api::health::liveness,
        crate::api::health::health_check,

        // Scholarships
        crate::api::scholarships::list_scholarships,
        crate::api::scholarships::get_scholarship,
        crate::api::scholarships::create_scholarship,
        crate::api::scholarships::update_scholarship,
        crate::api::scholarships::delete_scholarship,

        // Applications
        crate::api::applications::create_application,
        crate::api::applications::list_applications,
        crate::api::applications::list_user_applications,
        crate::api::applications::check_already_applied,
        crate::api::applications::update_application,
        crate::api::applications::cancel_application,
        crate::api::applications::update_application_status,
        crate::api::applications::delete_application,

        // Reviews
        crate::api::reviews::create_review,
        crate::api::reviews::list_reviews,
        crate::api::reviews::scholarship_reviews,
        crate::api::reviews::user_reviews,
        crate::api::reviews::update_review,
        crate::api::reviews::delete_review,

        // Users
        crate::api::users::create_user,
        crate::api::users::list_users,
        crate::api::users::get_user_role,
        crate::api::users::update_user_role,
        crate::api::users::delete_user,

        // Payments
        crate::api::payments::create_payment_intent,
        crate::api::payments::record_payment,
        crate::api::payments::list_payments,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,
            crate::models::InsertResponse,
            crate::models::MutationResponse,
            crate::models::CreateScholarshipRequest,
            crate::models::UpdateScholarshipRequest,
            crate::models::ApplicationStatus,
            crate::models::CreateApplicationRequest,
            crate::models::UpdateApplicationRequest,
            crate::models::UpdateStatusRequest,
            crate::models::AlreadyAppliedResponse,
            crate::models::CreateReviewRequest,
            crate::models::UpdateReviewRequest,
            crate::models::Role,
            crate::models::CreateUserRequest,
            crate::models::UpdateRoleRequest,
            crate::models::RoleResponse,
            crate::models::RecordPaymentRequest,
            crate::models::PaymentRecordedResponse,
            crate::models::CreatePaymentIntentRequest,
            crate::models::ClientSecretResponse,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and dependency status."),
        (name = "Scholarships", description = "Scholarship catalog."),
        (name = "Applications", description = "Applications to scholarships. One per (applicant, scholarship)."),
        (name = "Reviews", description = "Ratings and comments on scholarships."),
        (name = "Users", description = "Registered users and their roles."),
        (name = "Payments", description = "Payment intents on the processor and the payment ledger."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Identity provider ID token"))
                        .build(),
                ),
            );
        }
    }
}
