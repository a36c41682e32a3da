//! Caller identity verification.
//!
//! Callers present a Firebase ID token as a bearer credential. Tokens are
//! RS256 JWTs signed with Google's rotating keys, which are fetched from the
//! published JWKS and cached for as long as its `Cache-Control` allows.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::AuthConfig;

const DEFAULT_KEY_TTL: Duration = Duration::from_secs(3600);

/// Identity established from a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub uid: String,
    pub email: Option<String>,
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("No signing key with id {0}")]
    UnknownKey(String),

    #[error("Failed to fetch signing keys: {0}")]
    KeyFetch(String),

    #[error("Configuration Error: {0}")]
    Config(String),
}

/// Verifies bearer credentials against an identity service
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError>;
}

/// Extracts the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
}

struct CachedKeys {
    set: JwkSet,
    expires_at: Instant,
}

/// Firebase ID token verifier backed by Google's JWKS endpoint
pub struct FirebaseVerifier {
    project_id: String,
    jwks_url: String,
    http: Client,
    keys: RwLock<Option<CachedKeys>>,
}

impl FirebaseVerifier {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let project_id = config
            .project_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| AuthError::Config("Firebase project id is not set".to_string()))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AuthError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            project_id,
            jwks_url: config.jwks_url.clone(),
            http,
            keys: RwLock::new(None),
        })
    }

    fn issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.project_id)
    }

    /// Returns the decoding key for `kid`, refreshing the key set when it is
    /// stale or does not know the id (keys rotate).
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        {
            let cached = self.keys.read().await;
            if let Some(cached) = cached.as_ref() {
                if cached.expires_at > Instant::now() {
                    if let Some(jwk) = cached.set.find(kid) {
                        return DecodingKey::from_jwk(jwk)
                            .map_err(|e| AuthError::InvalidToken(e.to_string()));
                    }
                }
            }
        }

        let refreshed = self.fetch_keys().await?;
        let key = refreshed
            .set
            .find(kid)
            .map(DecodingKey::from_jwk)
            .transpose()
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        *self.keys.write().await = Some(refreshed);
        key.ok_or_else(|| AuthError::UnknownKey(kid.to_string()))
    }

    async fn fetch_keys(&self) -> Result<CachedKeys, AuthError> {
        debug!(url = %self.jwks_url, "Fetching token signing keys");

        let response = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AuthError::KeyFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::KeyFetch(format!(
                "key endpoint returned {}",
                response.status()
            )));
        }

        let ttl = response
            .headers()
            .get(reqwest::header::CACHE_CONTROL)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_max_age)
            .unwrap_or(DEFAULT_KEY_TTL);

        let set = response
            .json::<JwkSet>()
            .await
            .map_err(|e| AuthError::KeyFetch(format!("invalid key set: {}", e)))?;

        info!(keys = set.keys.len(), ttl_secs = ttl.as_secs(), "Loaded token signing keys");
        Ok(CachedKeys {
            set,
            expires_at: Instant::now() + ttl,
        })
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        let header = decode_header(token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::InvalidToken(format!(
                "unexpected algorithm {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidToken("missing key id".to_string()))?;

        let key = self.decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[self.issuer()]);
        validation.set_required_spec_claims(&["exp", "aud", "iss", "sub"]);

        let data = decode::<FirebaseClaims>(token, &key, &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        if data.claims.sub.trim().is_empty() {
            return Err(AuthError::InvalidToken("empty subject".to_string()));
        }

        Ok(VerifiedIdentity {
            uid: data.claims.sub,
            email: data.claims.email,
        })
    }
}

/// Reads `max-age=<secs>` out of a Cache-Control header value
fn parse_max_age(cache_control: &str) -> Option<Duration> {
    cache_control
        .split(',')
        .filter_map(|directive| directive.trim().strip_prefix("max-age="))
        .find_map(|secs| secs.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
