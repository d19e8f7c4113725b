//! Axum HTTP API server for the career board.
//!
//! This crate provides:
//! - Job posting and application endpoints
//! - Firebase ID token verification and per-applicant authorization
//! - Enrichment of applications with their job posting details
//! - Firestore and in-memory store backends
//! - Prometheus metrics

pub mod auth;
pub mod authz;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

pub use auth::{AuthError, FirebaseVerifier, IdentityVerifier, VerifiedIdentity};
pub use config::{ApiConfig, StoreBackend};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{ApplicationAggregator, DanglingPolicy};
pub use state::AppState;
pub use store::{CareerStore, MemoryStore};
