//! Job application documents.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{DocumentId, JobPosting};

/// Field holding the submitter's identity (email).
pub const APPLICANT_FIELD: &str = "applicant";

/// Field holding the referenced job posting's `_id`.
pub const JOB_REFERENCE_FIELD: &str = "id";

/// Field updated by status changes.
pub const STATUS_FIELD: &str = "status";

/// Fields copied from a job posting onto an application on read.
pub const ENRICHED_FIELDS: [&str; 3] = ["company", "title", "company_logo"];

/// One applicant's submission against one job posting.
///
/// Every client field is kept verbatim in `fields`, whatever its JSON type.
/// The posting reference travels as `id`; only `status` changes after
/// creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Application {
    /// Document id, assigned on insert
    #[serde(
        rename = "_id",
        default,
        deserialize_with = "DocumentId::deserialize_lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<DocumentId>,

    /// Client-supplied fields, verbatim
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Application {
    /// Assign a freshly generated id, replacing any client-supplied one.
    pub fn with_new_id(mut self) -> Self {
        self.id = Some(DocumentId::new());
        self
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// `applicant` when it is a string.
    pub fn applicant(&self) -> Option<&str> {
        self.field(APPLICANT_FIELD).and_then(Value::as_str)
    }

    /// The referenced posting id when it is a string.
    pub fn job_id(&self) -> Option<&str> {
        self.field(JOB_REFERENCE_FIELD).and_then(Value::as_str)
    }

    pub fn status(&self) -> Option<&Value> {
        self.field(STATUS_FIELD)
    }

    /// Replace `status`; `null` is stored as a value, not removed.
    pub fn set_status(&mut self, status: Value) {
        self.fields.insert(STATUS_FIELD.to_string(), status);
    }

    /// Denormalize the posting's display fields onto this application.
    ///
    /// Existing values of the copied fields are overwritten; a field the
    /// posting lacks is left absent.
    pub fn enrich(mut self, posting: &JobPosting) -> EnrichedApplication {
        for field in ENRICHED_FIELDS {
            match posting.field(field) {
                Some(value) => {
                    self.fields.insert(field.to_string(), value.clone());
                }
                None => {
                    self.fields.remove(field);
                }
            }
        }
        EnrichedApplication(self)
    }
}

/// An application with its job posting's display fields merged in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnrichedApplication(pub Application);

/// Body of a status update request. A missing `status` writes `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    #[serde(default)]
    pub status: Value,
}
