//! Bearer token verification.
//!
//! The API accepts Firebase Authentication ID tokens: RS256 JWTs signed with
//! keys Google publishes as a JWKS.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Google JWKS URL for Firebase Auth.
pub const GOOGLE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// Firebase token issuer prefix.
const FIREBASE_ISSUER_PREFIX: &str = "https://securetoken.google.com/";

/// JWKS cache TTL.
const JWKS_CACHE_TTL: Duration = Duration::from_secs(3600); // 1 hour

/// Minimum gap between refreshes triggered by an unknown key ID.
const JWKS_MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Why a token was not accepted.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token header: {0}")]
    MalformedToken(String),

    #[error("Token missing key ID")]
    MissingKeyId,

    #[error("Unknown key ID: {0}")]
    UnknownKey(String),

    #[error("Token validation failed: {0}")]
    Rejected(String),

    #[error("Identity provider unreachable: {0}")]
    ProviderUnavailable(String),
}

/// Identity asserted by a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub uid: String,
    /// Absent for accounts without an email, e.g. phone sign-in
    pub email: Option<String>,
    pub email_verified: bool,
}

/// Turns a bearer token into a verified identity.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify `token`. A single attempt; any failure is final for the request.
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError>;
}

/// Decoded Firebase ID token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebaseClaims {
    /// User ID
    pub sub: String,
    /// Email (if available)
    pub email: Option<String>,
    /// Email verified
    pub email_verified: Option<bool>,
    /// Issuer
    pub iss: String,
    /// Audience (Firebase project ID)
    pub aud: String,
    /// Issued at
    pub iat: i64,
    /// Expiration
    pub exp: i64,
    /// Authentication time
    pub auth_time: Option<i64>,
}

impl From<FirebaseClaims> for VerifiedIdentity {
    fn from(claims: FirebaseClaims) -> Self {
        Self {
            uid: claims.sub,
            email: claims.email,
            email_verified: claims.email_verified.unwrap_or(false),
        }
    }
}

/// JWKS response from Google.
#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<JwkKey>,
}

#[derive(Debug, Clone, Deserialize)]
struct JwkKey {
    kid: String,
    n: String,
    e: String,
}

#[derive(Default)]
struct KeySet {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Option<Instant>,
}

impl KeySet {
    fn is_stale(&self) -> bool {
        self.fetched_at.map_or(true, |t| t.elapsed() > JWKS_CACHE_TTL)
    }

    fn may_refresh_for_unknown_key(&self) -> bool {
        self.fetched_at.map_or(true, |t| t.elapsed() > JWKS_MIN_REFRESH_INTERVAL)
    }
}

/// Verifies Firebase ID tokens against a cached JWKS.
///
/// Keys are fetched on first use and refreshed hourly, or early when a token
/// names a key ID the cache has not seen.
pub struct FirebaseVerifier {
    http: Client,
    jwks_url: String,
    project_id: String,
    key_set: RwLock<KeySet>,
}

impl FirebaseVerifier {
    pub fn new(project_id: impl Into<String>, jwks_url: impl Into<String>) -> Result<Self, AuthError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))?;

        Ok(Self {
            http,
            jwks_url: jwks_url.into(),
            project_id: project_id.into(),
            key_set: RwLock::new(KeySet::default()),
        })
    }

    /// Fetch JWKS keys from the provider.
    async fn fetch_keys(&self) -> Result<HashMap<String, DecodingKey>, AuthError> {
        debug!("Refreshing JWKS keys");

        let response = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))?;
        let jwks: JwksResponse = response
            .json()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))?;

        let mut keys = HashMap::new();
        for jwk in jwks.keys {
            match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
                Ok(key) => {
                    keys.insert(jwk.kid, key);
                }
                Err(e) => warn!("Skipping unusable JWKS key {}: {}", jwk.kid, e),
            }
        }

        debug!("Refreshed {} JWKS keys", keys.len());
        Ok(keys)
    }

    /// Get decoding key for a key ID.
    async fn get_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        {
            let key_set = self.key_set.read().await;
            if !key_set.is_stale() {
                if let Some(key) = key_set.keys.get(kid) {
                    return Ok(key.clone());
                }
                if !key_set.may_refresh_for_unknown_key() {
                    return Err(AuthError::UnknownKey(kid.to_string()));
                }
            }
        }

        let mut key_set = self.key_set.write().await;
        // another request may have refreshed while we waited for the lock
        let refreshed_elsewhere = !key_set.is_stale() && key_set.keys.contains_key(kid);
        if !refreshed_elsewhere && (key_set.is_stale() || key_set.may_refresh_for_unknown_key()) {
            match self.fetch_keys().await {
                Ok(keys) => {
                    key_set.keys = keys;
                    key_set.fetched_at = Some(Instant::now());
                }
                // keep serving the previous keys while the provider is down
                Err(e) if !key_set.keys.is_empty() => warn!("Failed to refresh JWKS keys: {}", e),
                Err(e) => return Err(e),
            }
        }

        key_set
            .keys
            .get(kid)
            .cloned()
            .ok_or_else(|| AuthError::UnknownKey(kid.to_string()))
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[format!("{}{}", FIREBASE_ISSUER_PREFIX, self.project_id)]);
        validation.set_audience(&[&self.project_id]);
        validation
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        let header = decode_header(token).map_err(|e| AuthError::MalformedToken(e.to_string()))?;
        let kid = header.kid.ok_or(AuthError::MissingKeyId)?;
        let key = self.get_key(&kid).await?;

        let token_data = decode::<FirebaseClaims>(token, &key, &self.validation())
            .map_err(|e| AuthError::Rejected(e.to_string()))?;

        if token_data.claims.sub.is_empty() {
            return Err(AuthError::Rejected("empty subject".to_string()));
        }

        Ok(VerifiedIdentity::from(token_data.claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_to_identity() {
        let claims = FirebaseClaims {
            sub: "uid-1".to_string(),
            email: Some("a@x.com".to_string()),
            email_verified: None,
            iss: "https://securetoken.google.com/demo".to_string(),
            aud: "demo".to_string(),
            iat: 0,
            exp: 0,
            auth_time: None,
        };
        let identity = VerifiedIdentity::from(claims);
        assert_eq!(identity.email.as_deref(), Some("a@x.com"));
        assert!(!identity.email_verified);
    }

    #[test]
    fn test_empty_key_set_is_stale() {
        let key_set = KeySet::default();
        assert!(key_set.is_stale());
        assert!(key_set.may_refresh_for_unknown_key());
    }

    #[tokio::test]
    async fn test_garbage_token_is_malformed() {
        let verifier = FirebaseVerifier::new("demo", "http://127.0.0.1:9/jwks").unwrap();
        let err = verifier.verify("not-a-jwt").await.unwrap_err();
        assert!(matches!(err, AuthError::MalformedToken(_)));
    }
}
