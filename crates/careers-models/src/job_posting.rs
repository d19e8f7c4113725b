//! Job posting documents.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::DocumentId;

/// Field holding the owner's HR identity.
pub const HR_EMAIL_FIELD: &str = "hr_email";

/// An open role, owned by the HR identity in `hr_email`.
///
/// Postings are stored exactly as submitted. Every client field, whatever
/// its JSON type, lives in `fields`; the accessors below only read it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
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

impl JobPosting {
    /// Assign a freshly generated id, replacing any client-supplied one.
    pub fn with_new_id(mut self) -> Self {
        self.id = Some(DocumentId::new());
        self
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// `hr_email` when it is a string.
    pub fn hr_email(&self) -> Option<&str> {
        self.field(HR_EMAIL_FIELD).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fields_survive_round_trip() {
        let payload = json!({
            "hr_email": "hr@acme.io",
            "company": "Acme",
            "title": {"en": "Engineer", "de": "Ingenieur"},
            "company_logo": null,
            "salary_range": {"min": 100, "max": 200, "currency": "usd"},
            "requirements": ["rust", "sql"]
        });

        let posting: JobPosting = serde_json::from_value(payload.clone()).unwrap();
        assert_eq!(posting.fields.len(), 6);
        assert_eq!(serde_json::to_value(&posting).unwrap(), payload);
    }

    #[test]
    fn test_id_serializes_as_underscore_id() {
        let posting = JobPosting {
            id: Some(DocumentId::from("J1")),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&posting).unwrap(), json!({"_id": "J1"}));
    }

    #[test]
    fn test_with_new_id_replaces_client_id() {
        let posting: JobPosting = serde_json::from_value(json!({"_id": "forged"})).unwrap();
        let posting = posting.with_new_id();
        assert_ne!(posting.id, Some(DocumentId::from("forged")));
    }

    #[test]
    fn test_non_string_client_id_is_ignored() {
        let posting: JobPosting = serde_json::from_value(json!({"_id": 7, "company": "Acme"})).unwrap();
        assert_eq!(posting.id, None);
        assert!(!posting.fields.contains_key("_id"));
    }

    #[test]
    fn test_hr_email_reads_strings_only() {
        let posting: JobPosting = serde_json::from_value(json!({"hr_email": ["hr@acme.io"]})).unwrap();
        assert_eq!(posting.hr_email(), None);
        assert!(posting.field(HR_EMAIL_FIELD).is_some());
    }
}
