//! In-process store for local development and tests.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use careers_models::{Application, InsertAck, JobPosting, UpdateAck};

use super::{ApplicationFilter, CareerStore, StoreResult};

#[derive(Default)]
pub struct MemoryStore {
    postings: RwLock<Vec<JobPosting>>,
    applications: RwLock<Vec<Application>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CareerStore for MemoryStore {
    async fn list_job_postings(&self, hr_email: Option<&str>) -> StoreResult<Vec<JobPosting>> {
        let postings = self.postings.read().await;
        Ok(postings
            .iter()
            .filter(|p| hr_email.map_or(true, |email| p.hr_email() == Some(email)))
            .cloned()
            .collect())
    }

    async fn get_job_posting(&self, id: &str) -> StoreResult<Option<JobPosting>> {
        let postings = self.postings.read().await;
        Ok(postings
            .iter()
            .find(|p| p.id.as_ref().is_some_and(|i| i.as_str() == id))
            .cloned())
    }

    async fn get_job_postings(&self, ids: &[&str]) -> StoreResult<Vec<JobPosting>> {
        let postings = self.postings.read().await;
        Ok(postings
            .iter()
            .filter(|p| p.id.as_ref().is_some_and(|i| ids.iter().any(|want| *want == i.as_str())))
            .cloned()
            .collect())
    }

    async fn create_job_posting(&self, posting: JobPosting) -> StoreResult<InsertAck> {
        let posting = posting.with_new_id();
        let id = posting.id.clone().unwrap_or_default();
        self.postings.write().await.push(posting);
        Ok(InsertAck::new(id))
    }

    async fn list_applications(&self, filter: ApplicationFilter<'_>) -> StoreResult<Vec<Application>> {
        let applications = self.applications.read().await;
        Ok(applications
            .iter()
            .filter(|a| match filter {
                ApplicationFilter::Applicant(email) => a.applicant() == Some(email),
                ApplicationFilter::Job(job_id) => a.job_id() == Some(job_id),
            })
            .cloned()
            .collect())
    }

    async fn create_application(&self, application: Application) -> StoreResult<InsertAck> {
        let application = application.with_new_id();
        let id = application.id.clone().unwrap_or_default();
        self.applications.write().await.push(application);
        Ok(InsertAck::new(id))
    }

    async fn update_application_status(&self, id: &str, status: Value) -> StoreResult<UpdateAck> {
        let mut applications = self.applications.write().await;
        let Some(application) = applications
            .iter_mut()
            .find(|a| a.id.as_ref().is_some_and(|i| i.as_str() == id))
        else {
            return Ok(UpdateAck::unmatched());
        };

        if application.status() == Some(&status) {
            return Ok(UpdateAck::matched(false));
        }
        application.set_status(status);
        Ok(UpdateAck::matched(true))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn close(&self) {}

    fn backend(&self) -> &'static str {
        "memory"
    }
}
