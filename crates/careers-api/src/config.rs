//! API configuration.

use std::str::FromStr;

use careers_firestore::repos::{DEFAULT_APPLICATIONS_COLLECTION, DEFAULT_CAREERS_COLLECTION};
use tracing::warn;

use crate::auth::GOOGLE_JWKS_URL;
use crate::services::DanglingPolicy;

/// Which document store backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Firestore,
    /// In-process store, contents are lost on restart
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "firestore" => Ok(Self::Firestore),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown store backend: {}", other)),
        }
    }
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size
    pub max_body_size: usize,
    /// Serve Prometheus metrics at /metrics
    pub metrics_enabled: bool,
    pub store_backend: StoreBackend,
    /// Collection holding job postings
    pub careers_collection: String,
    /// Collection holding applications
    pub applications_collection: String,
    /// What to do with applications whose job posting no longer exists
    pub dangling_policy: DanglingPolicy,
    /// Firebase project whose ID tokens are accepted
    pub firebase_project_id: Option<String>,
    /// Where the token signing keys are published
    pub jwks_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: vec!["*".to_string()],
            max_body_size: 100 * 1024,
            metrics_enabled: true,
            store_backend: StoreBackend::Firestore,
            careers_collection: DEFAULT_CAREERS_COLLECTION.to_string(),
            applications_collection: DEFAULT_APPLICATIONS_COLLECTION.to_string(),
            dangling_policy: DanglingPolicy::Abort,
            firebase_project_id: None,
            jwks_url: GOOGLE_JWKS_URL.to_string(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .or_else(|_| std::env::var("API_PORT"))
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.metrics_enabled),
            store_backend: parse_or_default("STORE_BACKEND", defaults.store_backend),
            careers_collection: std::env::var("CAREERS_COLLECTION").unwrap_or(defaults.careers_collection),
            applications_collection: std::env::var("APPLICATIONS_COLLECTION")
                .unwrap_or(defaults.applications_collection),
            dangling_policy: parse_or_default("DANGLING_REFERENCE_POLICY", defaults.dangling_policy),
            firebase_project_id: std::env::var("FIREBASE_PROJECT_ID")
                .or_else(|_| std::env::var("GCP_PROJECT_ID"))
                .ok()
                .filter(|p| !p.is_empty()),
            jwks_url: std::env::var("FIREBASE_JWKS_URL").unwrap_or(defaults.jwks_url),
        }
    }
}

fn parse_or_default<T>(var: &str, default: T) -> T
where
    T: FromStr<Err = String>,
{
    match std::env::var(var) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Ignoring {}: {}", var, e);
            default
        }),
        Err(_) => default,
    }
}
