//! Parse LLM output into claim texts

use crate::error::ExtractorError;
use serde_json::Value;
use tracing::debug;

/// Parse a decomposition response into subclaim texts
///
/// Accepts, in order of preference: a JSON array (optionally inside a Markdown
/// code fence or surrounded by prose), whose items are strings, objects with a
/// `claim`/`subclaim` field, or tuples whose first item is the subclaim; a JSON
/// object with a `claims` array; and finally a bulleted or numbered list.
///
/// An empty array is a valid answer. Output with none of these shapes is an error.
pub fn parse_claim_list(response: &str) -> Result<Vec<String>, ExtractorError> {
    let body = strip_code_fence(response);

    if let Some(value) = parse_json_candidate(body) {
        return claims_from_value(&value);
    }

    let bullets = parse_list_lines(body);
    if !bullets.is_empty() {
        debug!("Fell back to list parsing ({} items)", bullets.len());
        return Ok(bullets);
    }

    Err(ExtractorError::InvalidFormat(format!(
        "Expected a JSON array of claims, got: {}",
        preview(response)
    )))
}

/// Parse a decontextualization response into the rewritten claim
///
/// Takes the first non-empty line, strips list markers, a leading
/// `Decontextualized claim:` label and surrounding quotes. Returns `None`
/// when nothing is left.
pub fn parse_rewrite(response: &str) -> Option<String> {
    let line = response.lines().map(str::trim).find(|l| !l.is_empty())?;
    let line = strip_list_marker(line).unwrap_or(line);
    let line = strip_label(line);
    let line = strip_quotes(line.trim()).trim();

    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}

fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    // Drop the opening fence line (```json or ```) and a closing fence if present
    let without_open = match trimmed.find('\n') {
        Some(idx) => &trimmed[idx + 1..],
        None => "",
    };
    without_open
        .trim_end()
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

fn parse_json_candidate(body: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if value.is_array() || value.is_object() {
            return Some(value);
        }
    }

    // JSON embedded in prose: first '[' to last ']'
    let start = body.find('[')?;
    let end = body.rfind(']')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Value>(&body[start..=end])
        .ok()
        .filter(Value::is_array)
}

fn claims_from_value(value: &Value) -> Result<Vec<String>, ExtractorError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(obj) => match obj.get("claims").or_else(|| obj.get("subclaims")) {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(ExtractorError::InvalidFormat(
                    "Expected JSON array or object with a 'claims' array".to_string(),
                ))
            }
        },
        _ => return Err(ExtractorError::InvalidFormat("Expected JSON array".to_string())),
    };

    let mut claims = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        match claim_text(item) {
            Some(text) => claims.push(text),
            None => debug!("Skipping unusable claim item {}: {}", idx, item),
        }
    }

    if claims.is_empty() && !items.is_empty() {
        return Err(ExtractorError::InvalidFormat(
            "No claim item had usable text".to_string(),
        ));
    }
    Ok(claims)
}

fn claim_text(item: &Value) -> Option<String> {
    let text = match item {
        Value::String(s) => s.as_str(),
        Value::Object(obj) => ["claim", "subclaim", "text"]
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_str))?,
        Value::Array(parts) => parts.first().and_then(Value::as_str)?,
        _ => return None,
    };
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn parse_list_lines(body: &str) -> Vec<String> {
    body.lines()
        .filter_map(|line| strip_list_marker(line.trim()))
        .map(|item| strip_quotes(item.trim()).trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Strip `- `, `* `, `• `, `1. ` or `1) `; `None` if the line is not a list item
fn strip_list_marker(line: &str) -> Option<&str> {
    for marker in ["- ", "* ", "• "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some(rest);
        }
    }

    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = &line[digits..];
    rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") "))
}

fn strip_label(line: &str) -> &str {
    const LABELS: [&str; 3] = ["decontextualized claim:", "decontextualized:", "claim:"];
    let lower = line.to_lowercase();
    for label in LABELS {
        if lower.starts_with(label) && line.is_char_boundary(label.len()) {
            return line[label.len()..].trim_start();
        }
    }
    line
}

/// Strip one pair of enclosing quotes
///
/// `"A" and "B"` starts and ends with a quote but is two quoted spans, so the
/// pair is only stripped when the inner text has no unescaped closing quote.
fn strip_quotes(text: &str) -> &str {
    for (open, close) in [('"', '"'), ('\'', '\''), ('“', '”'), ('`', '`')] {
        if text.len() >= open.len_utf8() + close.len_utf8()
            && text.starts_with(open)
            && text.ends_with(close)
        {
            let inner = &text[open.len_utf8()..text.len() - close.len_utf8()];
            if has_unescaped(inner, close) {
                return text;
            }
            return inner;
        }
    }
    text
}

fn has_unescaped(text: &str, quote: char) -> bool {
    let mut escaped = false;
    for c in text.chars() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return true;
        }
    }
    false
}

fn preview(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(80) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_string_array() {
        let claims = parse_claim_list(r#"["Paris is the capital of France."]"#).unwrap();
        assert_eq!(claims, vec!["Paris is the capital of France."]);
    }

    #[test]
    fn test_parse_json_with_markdown_wrapper() {
        let response = "```json\n[\"He was born in New York City.\", \"He was born on April 25, 1940.\"]\n```";
        let claims = parse_claim_list(response).unwrap();
        assert_eq!(claims.len(), 2);
        assert_eq!(claims[1], "He was born on April 25, 1940.");
    }

    #[test]
    fn test_parse_json_embedded_in_prose() {
        let response = "Here are the subclaims:\n[\"A is B\", \"C is D\"]\nHope this helps.";
        assert_eq!(parse_claim_list(response).unwrap(), vec!["A is B", "C is D"]);
    }

    #[test]
    fn test_parse_object_items_and_tuples() {
        let response = r#"[{"subclaim": "X was born in 1940"}, ["Y left school", "ctx"], {"claim": " Z "}]"#;
        assert_eq!(
            parse_claim_list(response).unwrap(),
            vec!["X was born in 1940", "Y left school", "Z"]
        );
    }

    #[test]
    fn test_parse_claims_object() {
        let response = r#"{"claims": ["one", "two"]}"#;
        assert_eq!(parse_claim_list(response).unwrap(), vec!["one", "two"]);
    }

    #[test]
    fn test_empty_array_is_valid() {
        assert!(parse_claim_list("[]").unwrap().is_empty());
        assert!(parse_claim_list("```\n[]\n```").unwrap().is_empty());
    }

    #[test]
    fn test_parse_bullet_fallback() {
        let response = "Subclaims:\n- He was born in New York City.\n2. \"He left school at 17.\"";
        assert_eq!(
            parse_claim_list(response).unwrap(),
            vec!["He was born in New York City.", "He left school at 17."]
        );
    }

    #[test]
    fn test_parse_invalid_response() {
        assert!(parse_claim_list("This is not JSON").is_err());
        assert!(parse_claim_list("").is_err());
        assert!(parse_claim_list("42").is_err());
    }

    #[test]
    fn test_array_without_usable_items_is_invalid() {
        assert!(parse_claim_list("[1, 2, null]").is_err());
    }

    #[test]
    fn test_parse_rewrite_plain() {
        assert_eq!(
            parse_rewrite("Paris has the Eiffel Tower.").as_deref(),
            Some("Paris has the Eiffel Tower.")
        );
    }

    #[test]
    fn test_parse_rewrite_strips_label_quotes_and_extra_lines() {
        let response = "\n  Decontextualized claim: \"Al Pacino was born in New York City.\"\nExplanation: ...";
        assert_eq!(
            parse_rewrite(response).as_deref(),
            Some("Al Pacino was born in New York City.")
        );
    }

    #[test]
    fn test_separate_quoted_spans_are_kept() {
        let rewrite = "\"The Godfather\" starred Al Pacino as \"Michael\"";
        assert_eq!(parse_rewrite(rewrite).as_deref(), Some(rewrite));

        assert_eq!(
            parse_claim_list("- \"Hamlet\" was written before \"Macbeth\"").unwrap(),
            vec!["\"Hamlet\" was written before \"Macbeth\""]
        );
    }

    #[test]
    fn test_escaped_inner_quote_still_strips() {
        assert_eq!(
            parse_rewrite(r#""He said \"hello\" twice""#).as_deref(),
            Some(r#"He said \"hello\" twice"#)
        );
        assert_eq!(parse_rewrite("“Paris is in France”").as_deref(), Some("Paris is in France"));
    }

    #[test]
    fn test_parse_rewrite_strips_list_marker() {
        assert_eq!(parse_rewrite("- Paris is in France").as_deref(), Some("Paris is in France"));
    }

    #[test]
    fn test_parse_rewrite_empty() {
        assert!(parse_rewrite("").is_none());
        assert!(parse_rewrite("  \n \"\" ").is_none());
        assert!(parse_rewrite("Decontextualized claim:").is_none());
    }
}
