mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod state;
mod utils;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::database::{DocumentStore, MemoryStore, MongoDB};
use crate::services::auth_service::JwtVerifier;
use crate::services::payment_intent_service::StripeClient;
use crate::state::AppState;

fn build_cors(allowed_origins: &[String]) -> Cors {
    let cors = if allowed_origins.is_empty() {
        Cors::default().allow_any_origin()
    } else {
        allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .supports_credentials()
    };

    cors.allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ])
        .expose_headers(vec![header::CONTENT_TYPE])
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("❌ Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    log::info!("🚀 Starting Scholarship Management System Server...");

    let store: Arc<dyn DocumentStore> = if config.uses_memory_store() {
        log::warn!("⚠️  Using the in-memory store, data is lost on restart");
        Arc::new(MemoryStore::new())
    } else {
        log::info!("📊 Database: {} / {}", config.redacted_database_url(), config.database_name);
        let db = MongoDB::new(&config.database_url, &config.database_name)
            .await
            .map_err(|e| {
                log::error!("❌ Failed to connect to MongoDB: {}", e);
                std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
            })?;
        log::info!("✅ MongoDB connected successfully");
        Arc::new(db)
    };

    let state = web::Data::new(AppState {
        store,
        verifier: Arc::new(JwtVerifier::firebase(
            &config.firebase_project_id,
            &config.identity_jwks_url,
        )),
        payments: Arc::new(StripeClient::new(
            &config.payment_gateway_key,
            &config.payment_api_base,
            &config.payment_currency,
        )),
    });

    let host = config.host.clone();
    let port = config.port;
    let allowed_origins = config.cors_allowed_origins.clone();

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", host, port);

    // Generate OpenAPI specification
    let openapi = api::swagger::ApiDoc::openapi();

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::AuthGate)
            .wrap(build_cors(&allowed_origins))
            .wrap(Logger::default())
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()))
            .configure(api::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
