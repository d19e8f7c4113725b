//! Firestore-backed store.

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use careers_firestore::{ApplicationRepository, FirestoreClient, JobPostingRepository};
use careers_models::{Application, InsertAck, JobPosting, UpdateAck};

use super::{ApplicationFilter, CareerStore, StoreResult};

#[derive(Clone)]
pub struct FirestoreStore {
    client: FirestoreClient,
    postings: JobPostingRepository,
    applications: ApplicationRepository,
}

impl FirestoreStore {
    pub fn new(
        client: FirestoreClient,
        careers_collection: impl Into<String>,
        applications_collection: impl Into<String>,
    ) -> Self {
        Self {
            postings: JobPostingRepository::new(client.clone(), careers_collection),
            applications: ApplicationRepository::new(client.clone(), applications_collection),
            client,
        }
    }
}

#[async_trait]
impl CareerStore for FirestoreStore {
    async fn list_job_postings(&self, hr_email: Option<&str>) -> StoreResult<Vec<JobPosting>> {
        Ok(self.postings.list(hr_email).await?)
    }

    async fn get_job_posting(&self, id: &str) -> StoreResult<Option<JobPosting>> {
        Ok(self.postings.get(id).await?)
    }

    async fn get_job_postings(&self, ids: &[&str]) -> StoreResult<Vec<JobPosting>> {
        Ok(self.postings.get_many(ids).await?.into_values().collect())
    }

    async fn create_job_posting(&self, posting: JobPosting) -> StoreResult<InsertAck> {
        let id = self.postings.create(posting).await?;
        Ok(InsertAck::new(id))
    }

    async fn list_applications(&self, filter: ApplicationFilter<'_>) -> StoreResult<Vec<Application>> {
        let applications = match filter {
            ApplicationFilter::Applicant(email) => self.applications.list_by_applicant(email).await?,
            ApplicationFilter::Job(job_id) => self.applications.list_by_job(job_id).await?,
        };
        Ok(applications)
    }

    async fn create_application(&self, application: Application) -> StoreResult<InsertAck> {
        let id = self.applications.create(application).await?;
        Ok(InsertAck::new(id))
    }

    async fn update_application_status(&self, id: &str, status: Value) -> StoreResult<UpdateAck> {
        Ok(self.applications.update_status(id, status).await?)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(self.client.ping().await?)
    }

    async fn close(&self) {
        self.client.close().await;
        info!("Firestore store closed");
    }

    fn backend(&self) -> &'static str {
        "firestore"
    }
}
