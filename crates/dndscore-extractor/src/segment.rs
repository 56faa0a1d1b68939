//! Sentence segmentation

use unicode_segmentation::UnicodeSegmentation;

/// Split `text` into trimmed, non-empty sentences using Unicode sentence boundaries
pub fn segment_sentences(text: &str) -> Vec<String> {
    text.unicode_sentences()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_sentences() {
        let s = segment_sentences("Paris is the capital of France. It has the Eiffel Tower.");
        assert_eq!(
            s,
            vec!["Paris is the capital of France.", "It has the Eiffel Tower."]
        );
    }

    #[test]
    fn test_unicode_and_whitespace() {
        let s = segment_sentences("  Hello world.  Καλημέρα κόσμε!  你好。 ");
        assert!(s.len() >= 3);
        assert_eq!(s[0], "Hello world.");
    }

    #[test]
    fn test_blank_text() {
        assert!(segment_sentences("   \n ").is_empty());
    }

    #[test]
    fn test_unterminated_sentence_is_kept() {
        let s = segment_sentences("He left school at age 17");
        assert_eq!(s, vec!["He left school at age 17"]);
    }
}
