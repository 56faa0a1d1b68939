//! Claim module - the atomic unit flowing through the pipeline

use crate::passage::PassageId;
use serde::{Deserialize, Serialize};

/// An atomic factual statement decomposed from a passage
///
/// Created by the Decomposer. The Decontextualizer is the only stage allowed to
/// change it afterwards, through [`Claim::apply_rewrite`] or
/// [`Claim::mark_rewrite_degraded`]; later stages only read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    text: String,
    source_passage_id: PassageId,
    ordinal: usize,
    sentence: String,
    contextual_text: Option<String>,
    rewrite_degraded: bool,
}

impl Claim {
    /// Create a claim as emitted by the Decomposer
    ///
    /// # Examples
    ///
    /// ```
    /// use dndscore_domain::{Claim, PassageId};
    ///
    /// let claim = Claim::new("It has the Eiffel Tower", PassageId::new("p1"), 1, "It has the Eiffel Tower.");
    /// assert_eq!(claim.ordinal(), 1);
    /// assert!(claim.contextual_text().is_none());
    /// ```
    pub fn new(
        text: impl Into<String>,
        source_passage_id: PassageId,
        ordinal: usize,
        sentence: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            source_passage_id,
            ordinal,
            sentence: sentence.into(),
            contextual_text: None,
            rewrite_degraded: false,
        }
    }

    /// Current claim text (self-contained once decontextualized)
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Passage this claim was decomposed from
    pub fn source_passage_id(&self) -> &PassageId {
        &self.source_passage_id
    }

    /// Emission position from the Decomposer
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Passage sentence the claim was decomposed from
    pub fn sentence(&self) -> &str {
        &self.sentence
    }

    /// Text before decontextualization, if the claim has been rewritten
    pub fn contextual_text(&self) -> Option<&str> {
        self.contextual_text.as_deref()
    }

    /// Whether the rewrite fell back to the original text
    pub fn is_rewrite_degraded(&self) -> bool {
        self.rewrite_degraded
    }

    /// Replace the text with its self-contained rewrite
    ///
    /// The pre-rewrite text is kept in `contextual_text`. Calling this twice keeps
    /// the first pre-rewrite text so provenance always points at the decomposed claim.
    pub fn apply_rewrite(&mut self, rewritten: impl Into<String>) {
        let previous = std::mem::replace(&mut self.text, rewritten.into());
        if self.contextual_text.is_none() {
            self.contextual_text = Some(previous);
        }
        self.rewrite_degraded = false;
    }

    /// Keep the original text because no rewrite could be produced
    pub fn mark_rewrite_degraded(&mut self) {
        if self.contextual_text.is_none() {
            self.contextual_text = Some(self.text.clone());
        }
        self.rewrite_degraded = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim() -> Claim {
        Claim::new("It has the Eiffel Tower", PassageId::new("p"), 1, "It has the Eiffel Tower.")
    }

    #[test]
    fn test_apply_rewrite_keeps_contextual_text() {
        let mut c = claim();
        c.apply_rewrite("Paris has the Eiffel Tower");
        assert_eq!(c.text(), "Paris has the Eiffel Tower");
        assert_eq!(c.contextual_text(), Some("It has the Eiffel Tower"));
        assert!(!c.is_rewrite_degraded());
    }

    #[test]
    fn test_second_rewrite_preserves_original() {
        let mut c = claim();
        c.apply_rewrite("Paris has the Eiffel Tower");
        c.apply_rewrite("Paris, France has the Eiffel Tower");
        assert_eq!(c.contextual_text(), Some("It has the Eiffel Tower"));
    }

    #[test]
    fn test_mark_rewrite_degraded() {
        let mut c = claim();
        c.mark_rewrite_degraded();
        assert_eq!(c.text(), "It has the Eiffel Tower");
        assert_eq!(c.contextual_text(), Some("It has the Eiffel Tower"));
        assert!(c.is_rewrite_degraded());
    }
}
