//! Passage module - the immutable input being scored

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque source identifier for a passage
///
/// Callers may supply their own identifier (a dataset row id, a file name);
/// otherwise one is generated from a UUIDv7 so that ids sort by creation time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PassageId(String);

impl PassageId {
    /// Wrap a caller-supplied identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh UUIDv7-based identifier
    ///
    /// # Examples
    ///
    /// ```
    /// use dndscore_domain::PassageId;
    ///
    /// let id = PassageId::generate();
    /// assert_eq!(id.as_str().len(), 36);
    /// ```
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PassageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PassageId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The original input text, immutable once ingested
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    id: PassageId,
    text: String,
}

impl Passage {
    /// Ingest a passage under the given identifier
    pub fn new(id: PassageId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }

    /// Ingest a passage under a freshly generated identifier
    pub fn with_generated_id(text: impl Into<String>) -> Self {
        Self::new(PassageId::generate(), text)
    }

    /// Source identifier
    pub fn id(&self) -> &PassageId {
        &self.id
    }

    /// Full passage text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// True when the passage contains nothing but whitespace
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = PassageId::generate();
        let b = PassageId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_caller_supplied_id() {
        let passage = Passage::new(PassageId::new("doc-7"), "Some text.");
        assert_eq!(passage.id().as_str(), "doc-7");
        assert_eq!(passage.text(), "Some text.");
        assert!(!passage.is_blank());
    }

    #[test]
    fn test_blank_passage() {
        let passage = Passage::with_generated_id("   \n\t");
        assert!(passage.is_blank());
    }

    #[test]
    fn test_passage_id_serializes_as_plain_string() {
        let id = PassageId::new("row-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"row-1\"");
    }
}
