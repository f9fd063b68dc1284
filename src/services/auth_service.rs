// ==================== IDENTITY VERIFICATION ====================
// Bearer tokens are ID tokens issued by the identity provider (Firebase /
// Google Secure Token). Signatures are checked against the provider's JWKS.

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;

pub const GOOGLE_SECURE_TOKEN_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// Provider keys rotate every few hours; an unknown `kid` forces a refetch anyway
const JWKS_TTL: Duration = Duration::from_secs(60 * 60);

/// Unknown `kid`s refetch the key set at most this often
const JWKS_MIN_REFETCH: Duration = Duration::from_secs(60);

/// Identity proven by a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub subject: String,
    pub email: Option<String>,
    pub email_verified: bool,
    pub issued_at: i64,
    pub expires_at: i64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("no signing key for kid '{0}'")]
    UnknownKey(String),
    #[error("invalid token: {0}")]
    Invalid(String),
    #[error("failed to fetch signing keys: {0}")]
    KeyFetch(String),
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    iat: i64,
    exp: i64,
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError>;
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

pub enum KeySource {
    /// RS256 keys published by the identity provider
    Jwks {
        url: String,
        http: reqwest::Client,
        cache: RwLock<Option<CachedKeys>>,
    },
    /// HS256 shared secret
    Secret(DecodingKey),
}

pub struct JwtVerifier {
    keys: KeySource,
    issuer: String,
    audience: String,
}

impl JwtVerifier {
    /// Verifier for Firebase ID tokens of the given project.
    pub fn firebase(project_id: &str, jwks_url: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();

        Self {
            keys: KeySource::Jwks {
                url: jwks_url.to_string(),
                http,
                cache: RwLock::new(None),
            },
            issuer: format!("https://securetoken.google.com/{}", project_id),
            audience: project_id.to_string(),
        }
    }

    pub fn with_secret(secret: &[u8], issuer: &str, audience: &str) -> Self {
        Self {
            keys: KeySource::Secret(DecodingKey::from_secret(secret)),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
        }
    }

    fn validation(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "aud", "iss"]);
        validation
    }

    async fn decoding_key(&self, kid: Option<&str>) -> Result<(DecodingKey, Algorithm), AuthError> {
        match &self.keys {
            KeySource::Secret(key) => Ok((key.clone(), Algorithm::HS256)),
            KeySource::Jwks { url, http, cache } => {
                let kid = kid.ok_or_else(|| AuthError::UnknownKey("<none>".to_string()))?;

                {
                    let cached = cache.read().await;
                    if let Some(cached) = cached.as_ref() {
                        let age = cached.fetched_at.elapsed();
                        if age < JWKS_TTL {
                            if let Some(key) = rs256_key(&cached.keys, kid)? {
                                return Ok(key);
                            }
                            if age < JWKS_MIN_REFETCH {
                                return Err(AuthError::UnknownKey(kid.to_string()));
                            }
                        }
                    }
                }

                let mut cached = cache.write().await;

                // Another request may have refreshed the keys while this one waited
                if let Some(fresh) = cached.as_ref().filter(|c| c.fetched_at.elapsed() < JWKS_MIN_REFETCH) {
                    return rs256_key(&fresh.keys, kid)?
                        .ok_or_else(|| AuthError::UnknownKey(kid.to_string()));
                }

                let keys = fetch_jwks(http, url).await?;
                let key = rs256_key(&keys, kid)?;
                *cached = Some(CachedKeys {
                    keys,
                    fetched_at: Instant::now(),
                });

                key.ok_or_else(|| AuthError::UnknownKey(kid.to_string()))
            }
        }
    }
}

fn rs256_key(keys: &JwkSet, kid: &str) -> Result<Option<(DecodingKey, Algorithm)>, AuthError> {
    keys.find(kid)
        .map(|jwk| {
            DecodingKey::from_jwk(jwk)
                .map(|key| (key, Algorithm::RS256))
                .map_err(|e| AuthError::Invalid(e.to_string()))
        })
        .transpose()
}

async fn fetch_jwks(http: &reqwest::Client, url: &str) -> Result<JwkSet, AuthError> {
    log::debug!("🔑 Fetching identity provider keys from {}", url);

    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| AuthError::KeyFetch(e.to_string()))?;

    if !response.status().is_success() {
        return Err(AuthError::KeyFetch(format!("status {}", response.status())));
    }

    response
        .json::<JwkSet>()
        .await
        .map_err(|e| AuthError::KeyFetch(e.to_string()))
}

#[async_trait]
impl IdentityVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        let header = decode_header(token).map_err(|e| AuthError::Malformed(e.to_string()))?;
        let (key, algorithm) = self.decoding_key(header.kid.as_deref()).await?;

        let data = decode::<TokenClaims>(token, &key, &self.validation(algorithm))
            .map_err(|e| AuthError::Invalid(e.to_string()))?;

        Ok(VerifiedIdentity {
            subject: data.claims.sub,
            email: data.claims.email,
            email_verified: data.claims.email_verified,
            issued_at: data.claims.iat,
            expires_at: data.claims.exp,
        })
    }
}
