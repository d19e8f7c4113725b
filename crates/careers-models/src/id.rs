//! Document identifiers.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Opaque identifier of a stored document.
///
/// New ids are UUIDv7 strings, so sorting ids lexically yields creation order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub String);

impl DocumentId {
    /// Generate a new time-ordered id.
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id can address a single document.
    ///
    /// Empty ids, ids containing a path separator, and ids reserved by the
    /// document store (`__name__`-style) never resolve.
    pub fn is_addressable(&self) -> bool {
        let reserved = self.0.len() >= 4 && self.0.starts_with("__") && self.0.ends_with("__");
        !self.0.is_empty() && !self.0.contains('/') && self.0 != "." && self.0 != ".." && !reserved
    }

    /// Read an optional id from client JSON, treating anything but a string
    /// as absent. Client-supplied ids are replaced on insert.
    pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<Self>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Some(Self(s)),
            _ => None,
        })
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
