use std::env;

use thiserror::Error;

use crate::services::auth_service::GOOGLE_SECURE_TOKEN_JWKS_URL;
use crate::services::payment_intent_service::STRIPE_API_BASE;

/// `DATABASE_URL` value that selects the in-process store
pub const MEMORY_STORE_URL: &str = "memory://";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_name: String,
    pub payment_gateway_key: String,
    pub payment_api_base: String,
    pub payment_currency: String,
    pub firebase_project_id: String,
    pub identity_jwks_url: String,
    /// Empty means any origin
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    /// Reads the process environment. `.env` must already be loaded.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                key: "PORT",
                reason: e.to_string(),
            })?,
            None => 5000,
        };

        let database_url = match get("DATABASE_URL") {
            Some(url) => url,
            None => format!(
                "mongodb+srv://{}:{}@{}/?retryWrites=true&w=majority",
                require("DB_USER")?,
                require("DB_PASS")?,
                require("DB_HOST")?
            ),
        };

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            database_url,
            database_name: get("DATABASE_NAME").unwrap_or_else(|| "scholarDB".to_string()),
            payment_gateway_key: require("PAYMENT_GATEWAY_KEY")?,
            payment_api_base: get("PAYMENT_API_BASE").unwrap_or_else(|| STRIPE_API_BASE.to_string()),
            payment_currency: get("PAYMENT_CURRENCY").unwrap_or_else(|| "usd".to_string()),
            firebase_project_id: require("FIREBASE_PROJECT_ID")?,
            identity_jwks_url: get("IDENTITY_JWKS_URL")
                .unwrap_or_else(|| GOOGLE_SECURE_TOKEN_JWKS_URL.to_string()),
            cors_allowed_origins,
        })
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url == MEMORY_STORE_URL
    }

    /// Connection string with the password masked, for logs.
    pub fn redacted_database_url(&self) -> String {
        match (self.database_url.find("://"), self.database_url.rfind('@')) {
            (Some(scheme_end), Some(at)) if at > scheme_end => {
                let credentials = &self.database_url[scheme_end + 3..at];
                let user = credentials.split(':').next().unwrap_or_default();
                format!(
                    "{}{}:****{}",
                    &self.database_url[..scheme_end + 3],
                    user,
                    &self.database_url[at..]
                )
            }
            _ => self.database_url.clone(),
        }
    }
}
