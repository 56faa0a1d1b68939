//! Evidence that claims are checked against

use serde::{Deserialize, Serialize};

/// Evidence source: one text, or a list of passages such as search snippets
///
/// Deserializes from either a JSON string or an array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Evidence {
    /// A single evidence text
    Text(String),

    /// Independent evidence passages, each checked separately
    Passages(Vec<String>),
}

impl Evidence {
    /// No evidence at all
    pub fn empty() -> Self {
        Evidence::Passages(Vec::new())
    }

    /// Non-blank passages with their index in the original list
    pub fn passages(&self) -> Vec<(usize, &str)> {
        let all: Vec<&str> = match self {
            Evidence::Text(text) => vec![text.as_str()],
            Evidence::Passages(list) => list.iter().map(String::as_str).collect(),
        };
        all.into_iter()
            .enumerate()
            .filter(|(_, p)| !p.trim().is_empty())
            .collect()
    }

    /// Number of usable passages
    pub fn len(&self) -> usize {
        self.passages().len()
    }

    /// True when there is nothing to check against
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Evidence {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<String> for Evidence {
    fn from(text: String) -> Self {
        Evidence::Text(text)
    }
}

impl From<&str> for Evidence {
    fn from(text: &str) -> Self {
        Evidence::Text(text.to_string())
    }
}

impl From<Vec<String>> for Evidence {
    fn from(passages: Vec<String>) -> Self {
        Evidence::Passages(passages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_passages_are_skipped_but_keep_indices() {
        let evidence = Evidence::from(vec!["a".to_string(), "  ".to_string(), "c".to_string()]);
        assert_eq!(evidence.passages(), vec![(0, "a"), (2, "c")]);
        assert_eq!(evidence.len(), 2);
    }

    #[test]
    fn test_empty_evidence() {
        assert!(Evidence::empty().is_empty());
        assert!(Evidence::from("   ").is_empty());
        assert!(!Evidence::from("Paris is in France.").is_empty());
    }

    #[test]
    fn test_deserialize_string_or_list() {
        let one: Evidence = serde_json::from_str(r#""text""#).unwrap();
        assert_eq!(one, Evidence::Text("text".into()));

        let many: Evidence = serde_json::from_str(r#"["a", "b"]"#).unwrap();
        assert_eq!(many, Evidence::Passages(vec!["a".into(), "b".into()]));
    }
}
