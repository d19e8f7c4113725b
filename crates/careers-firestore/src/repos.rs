//! Typed repositories for job postings and applications.

use std::collections::{HashMap, HashSet};

use metrics::counter;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use careers_models::application::{APPLICANT_FIELD, JOB_REFERENCE_FIELD, STATUS_FIELD};
use careers_models::job_posting::HR_EMAIL_FIELD;
use careers_models::{Application, DocumentId, JobPosting, UpdateAck};

use crate::client::{FirestoreClient, MAX_BATCH_GET};
use crate::error::{FirestoreError, FirestoreResult};
use crate::types::{json_to_fields, Document, StructuredQuery, Value};

/// JSON key that carries the document id in API payloads.
const ID_FIELD: &str = "_id";

/// Default collection holding job postings.
pub const DEFAULT_CAREERS_COLLECTION: &str = "career";

/// Default collection holding applications.
pub const DEFAULT_APPLICATIONS_COLLECTION: &str = "applications";

/// Repository for job posting documents.
#[derive(Clone)]
pub struct JobPostingRepository {
    client: FirestoreClient,
    collection: String,
}

impl JobPostingRepository {
    pub fn new(client: FirestoreClient, collection: impl Into<String>) -> Self {
        Self {
            client,
            collection: collection.into(),
        }
    }

    /// All postings in insertion order, optionally only those posted by `hr_email`.
    pub async fn list(&self, hr_email: Option<&str>) -> FirestoreResult<Vec<JobPosting>> {
        let mut query = StructuredQuery::collection(&self.collection);
        if let Some(email) = hr_email {
            query = query.where_equal(HR_EMAIL_FIELD, Value::string(email));
        }

        let docs = self.client.run_query(None, query).await?;
        docs.into_iter().map(from_document).collect()
    }

    /// Get a posting by id.
    pub async fn get(&self, id: &str) -> FirestoreResult<Option<JobPosting>> {
        if !DocumentId::from(id).is_addressable() {
            return Ok(None);
        }

        match self.client.get_document(&self.collection, id).await? {
            Some(doc) => Ok(Some(from_document(doc)?)),
            None => Ok(None),
        }
    }

    /// Fetch many postings at once, keyed by id.
    ///
    /// Ids with no stored posting are absent from the result.
    pub async fn get_many(&self, ids: &[&str]) -> FirestoreResult<HashMap<String, JobPosting>> {
        let mut seen = HashSet::new();
        let names: Vec<String> = ids
            .iter()
            .copied()
            .filter(|id| DocumentId::from(*id).is_addressable() && seen.insert(*id))
            .map(|id| self.client.full_document_name(&self.collection, id))
            .collect();

        let mut postings = HashMap::with_capacity(names.len());
        for chunk in names.chunks(MAX_BATCH_GET) {
            let docs = self
                .client
                .batch_get_documents(&self.collection, chunk.to_vec())
                .await?;
            for doc in docs {
                let posting: JobPosting = from_document(doc)?;
                if let Some(id) = posting.id.clone() {
                    postings.insert(id.0, posting);
                }
            }
        }

        debug!(
            requested = ids.len(),
            found = postings.len(),
            "Resolved job postings"
        );
        Ok(postings)
    }

    /// Store a new posting under a fresh id.
    pub async fn create(&self, posting: JobPosting) -> FirestoreResult<DocumentId> {
        let posting = posting.with_new_id();
        let id = posting.id.clone().unwrap_or_default();

        self.client
            .create_document(&self.collection, id.as_str(), to_fields(&posting)?)
            .await?;

        counter!("careers_postings_created_total").increment(1);
        info!("Created job posting: {}", id);
        Ok(id)
    }
}

/// Repository for application documents.
#[derive(Clone)]
pub struct ApplicationRepository {
    client: FirestoreClient,
    collection: String,
}

impl ApplicationRepository {
    pub fn new(client: FirestoreClient, collection: impl Into<String>) -> Self {
        Self {
            client,
            collection: collection.into(),
        }
    }

    /// Applications submitted by `applicant`, in insertion order.
    pub async fn list_by_applicant(&self, applicant: &str) -> FirestoreResult<Vec<Application>> {
        self.list_where(APPLICANT_FIELD, applicant).await
    }

    /// Applications referencing job posting `job_id`, in insertion order.
    pub async fn list_by_job(&self, job_id: &str) -> FirestoreResult<Vec<Application>> {
        self.list_where(JOB_REFERENCE_FIELD, job_id).await
    }

    async fn list_where(&self, field: &str, value: &str) -> FirestoreResult<Vec<Application>> {
        let query = StructuredQuery::collection(&self.collection).where_equal(field, Value::string(value));
        let docs = self.client.run_query(None, query).await?;
        docs.into_iter().map(from_document).collect()
    }

    /// Store a new application under a fresh id.
    pub async fn create(&self, application: Application) -> FirestoreResult<DocumentId> {
        let application = application.with_new_id();
        let id = application.id.clone().unwrap_or_default();

        self.client
            .create_document(&self.collection, id.as_str(), to_fields(&application)?)
            .await?;

        counter!("careers_applications_created_total").increment(1);
        info!("Created application: {}", id);
        Ok(id)
    }

    /// Set the status of one application to any JSON value, `null` included.
    ///
    /// Matching is by id; the write is skipped when the stored status is
    /// already equal, and rejected with `PreconditionFailed` if the document
    /// changed between read and write.
    pub async fn update_status(&self, id: &str, status: serde_json::Value) -> FirestoreResult<UpdateAck> {
        if !DocumentId::from(id).is_addressable() {
            return Ok(UpdateAck::unmatched());
        }

        let Some(doc) = self.client.get_document(&self.collection, id).await? else {
            return Ok(UpdateAck::unmatched());
        };

        let new_value = Value::from(status);
        let current = doc.fields.as_ref().and_then(|f| f.get(STATUS_FIELD));
        if current == Some(&new_value) {
            debug!("Application {} already has the requested status", id);
            return Ok(UpdateAck::matched(false));
        }

        let mut fields = HashMap::new();
        fields.insert(STATUS_FIELD.to_string(), new_value);
        self.client
            .update_document_with_precondition(
                &self.collection,
                id,
                fields,
                &[STATUS_FIELD],
                doc.update_time.as_deref(),
            )
            .await?;

        info!("Updated status of application {}", id);
        Ok(UpdateAck::matched(true))
    }
}

/// Convert a model into document fields; the id lives in the document name.
fn to_fields<T: Serialize>(model: &T) -> FirestoreResult<HashMap<String, Value>> {
    match serde_json::to_value(model)? {
        serde_json::Value::Object(mut object) => {
            object.remove(ID_FIELD);
            Ok(json_to_fields(object))
        }
        _ => Err(FirestoreError::invalid_document("model is not a JSON object")),
    }
}

fn from_document<T: DeserializeOwned>(doc: Document) -> FirestoreResult<T> {
    let object = doc.into_json_object(ID_FIELD)?;
    serde_json::from_value(serde_json::Value::Object(object))
        .map_err(|e| FirestoreError::invalid_document(format!("unexpected document shape: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_fields_drops_id() {
        let posting: JobPosting = serde_json::from_value(json!({
            "_id": "J1",
            "hr_email": "hr@acme.io",
            "salary": 120000
        }))
        .unwrap();

        let fields = to_fields(&posting).unwrap();
        assert!(!fields.contains_key("_id"));
        assert_eq!(fields.get("hr_email"), Some(&Value::string("hr@acme.io")));
        assert_eq!(fields.get("salary"), Some(&Value::IntegerValue("120000".to_string())));
    }

    #[test]
    fn test_from_document_exposes_name_as_id() {
        let mut fields = HashMap::new();
        fields.insert("applicant".to_string(), Value::string("a@x.com"));
        fields.insert("id".to_string(), Value::string("J1"));
        let doc = Document {
            name: Some("projects/p/databases/(default)/documents/applications/A1".to_string()),
            fields: Some(fields),
            ..Default::default()
        };

        let app: Application = from_document(doc).unwrap();
        assert_eq!(app.id, Some(DocumentId::from("A1")));
        assert_eq!(app.job_id(), Some("J1"));
    }

    #[test]
    fn test_from_document_rejects_unnamed() {
        let result: FirestoreResult<JobPosting> = from_document(Document::default());
        assert!(matches!(result, Err(FirestoreError::InvalidDocument(_))));
    }
}
