//! Document store gateway.
//!
//! Handlers and the aggregator talk to a [`CareerStore`]; the backend is
//! chosen at startup.

mod firestore;
mod memory;

use async_trait::async_trait;
use thiserror::Error;

use serde_json::Value;

use careers_firestore::FirestoreError;
use careers_models::{Application, InsertAck, JobPosting, UpdateAck};

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Concurrent modification: {0}")]
    Conflict(String),

    #[error("Store error: {0}")]
    Backend(String),
}

impl From<FirestoreError> for StoreError {
    fn from(e: FirestoreError) -> Self {
        if e.is_unavailable() {
            StoreError::Unavailable(e.to_string())
        } else if e.is_precondition_failed() {
            StoreError::Conflict(e.to_string())
        } else {
            StoreError::Backend(e.to_string())
        }
    }
}

/// Which applications to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationFilter<'a> {
    /// Submitted by this applicant email
    Applicant(&'a str),
    /// Referencing this job posting id
    Job(&'a str),
}

/// Job postings and applications.
///
/// Lists come back in insertion order.
#[async_trait]
pub trait CareerStore: Send + Sync {
    /// All postings, or only those whose `hr_email` equals the filter.
    async fn list_job_postings(&self, hr_email: Option<&str>) -> StoreResult<Vec<JobPosting>>;

    async fn get_job_posting(&self, id: &str) -> StoreResult<Option<JobPosting>>;

    /// Postings for the given ids; unknown ids are left out.
    async fn get_job_postings(&self, ids: &[&str]) -> StoreResult<Vec<JobPosting>>;

    async fn create_job_posting(&self, posting: JobPosting) -> StoreResult<InsertAck>;

    async fn list_applications(&self, filter: ApplicationFilter<'_>) -> StoreResult<Vec<Application>>;

    async fn create_application(&self, application: Application) -> StoreResult<InsertAck>;

    /// Set `status` on one application, leaving every other field untouched.
    /// `null` is stored as a value.
    async fn update_application_status(&self, id: &str, status: Value) -> StoreResult<UpdateAck>;

    /// Round trip to the backend.
    async fn ping(&self) -> StoreResult<()>;

    /// Release backend resources.
    async fn close(&self);

    /// Short backend name for logs and readiness output.
    fn backend(&self) -> &'static str;
}
