//! Write acknowledgments.
//!
//! Shapes follow the insert/update results the web client already consumes.

use serde::{Deserialize, Serialize};

use crate::DocumentId;

/// Result of inserting one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    pub acknowledged: bool,
    pub inserted_id: DocumentId,
}

impl InsertAck {
    pub fn new(inserted_id: DocumentId) -> Self {
        Self {
            acknowledged: true,
            inserted_id,
        }
    }
}

/// Result of a single-document partial update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<DocumentId>,
    pub upserted_count: u64,
}

impl UpdateAck {
    /// No document matched the filter.
    pub fn unmatched() -> Self {
        Self::with_counts(0, 0)
    }

    /// One document matched; `modified` is false when the value was already set.
    pub fn matched(modified: bool) -> Self {
        Self::with_counts(1, u64::from(modified))
    }

    fn with_counts(matched_count: u64, modified_count: u64) -> Self {
        Self {
            acknowledged: true,
            matched_count,
            modified_count,
            upserted_id: None,
            upserted_count: 0,
        }
    }
}
