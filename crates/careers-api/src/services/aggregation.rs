//! Application enrichment.
//!
//! An applicant's applications are returned with the display fields of the
//! job posting each one references.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use careers_models::application::JOB_REFERENCE_FIELD;
use careers_models::{Application, EnrichedApplication, JobPosting};

use crate::metrics;
use crate::store::{CareerStore, StoreError};

/// What to do with an application whose job posting does not resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DanglingPolicy {
    /// Fail the whole listing
    #[default]
    Abort,
    /// Leave the application out and report its id
    Skip,
}

impl FromStr for DanglingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            other => Err(format!("unknown dangling reference policy: {}", other)),
        }
    }
}

#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("Application {application_id} references missing job posting {job_id}")]
    DanglingReference { application_id: String, job_id: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Enriched applications in input order, plus the ids of applications
/// left out under [`DanglingPolicy::Skip`].
#[derive(Debug, Default)]
pub struct Aggregated {
    pub applications: Vec<EnrichedApplication>,
    pub unresolved: Vec<String>,
}

impl Aggregated {
    pub fn is_partial(&self) -> bool {
        !self.unresolved.is_empty()
    }
}

/// Joins applications with their job postings.
#[derive(Clone)]
pub struct ApplicationAggregator {
    store: Arc<dyn CareerStore>,
    policy: DanglingPolicy,
}

impl ApplicationAggregator {
    pub fn new(store: Arc<dyn CareerStore>, policy: DanglingPolicy) -> Self {
        Self { store, policy }
    }

    /// Enrich `applications`, already filtered to one applicant.
    ///
    /// Postings are read in one batch keyed by the distinct referenced ids.
    pub async fn enrich(&self, applications: Vec<Application>) -> Result<Aggregated, AggregationError> {
        if applications.is_empty() {
            return Ok(Aggregated::default());
        }

        let mut job_ids: Vec<&str> = applications.iter().filter_map(Application::job_id).collect();
        job_ids.sort_unstable();
        job_ids.dedup();

        let postings: HashMap<String, JobPosting> = self
            .store
            .get_job_postings(&job_ids)
            .await?
            .into_iter()
            .filter_map(|p| p.id.clone().map(|id| (id.0, p)))
            .collect();
        debug!(
            applications = applications.len(),
            postings = postings.len(),
            "Resolved referenced job postings"
        );

        let mut aggregated = Aggregated {
            applications: Vec::with_capacity(applications.len()),
            unresolved: Vec::new(),
        };

        for application in applications {
            let posting = application.job_id().and_then(|id| postings.get(id));
            match posting {
                Some(posting) => aggregated.applications.push(application.enrich(posting)),
                None => {
                    let application_id = application.id.as_ref().map(|i| i.to_string()).unwrap_or_default();
                    let job_id = job_reference_text(&application);
                    metrics::record_unresolved_application();

                    match self.policy {
                        DanglingPolicy::Abort => {
                            return Err(AggregationError::DanglingReference { application_id, job_id });
                        }
                        DanglingPolicy::Skip => {
                            warn!(%application_id, %job_id, "Skipping application with missing job posting");
                            aggregated.unresolved.push(application_id);
                        }
                    }
                }
            }
        }

        metrics::record_enriched_applications(aggregated.applications.len());
        Ok(aggregated)
    }
}

/// The posting reference as text for errors and logs; empty when absent.
fn job_reference_text(application: &Application) -> String {
    match application.field(JOB_REFERENCE_FIELD) {
        Some(Value::String(id)) => id.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
