use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

fn fenced_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)```").unwrap())
}

/// Best-effort extraction of a JSON object from noisy model output.
///
/// The contents of a fenced code block are preferred when they yield an
/// object. Failing that, the whole text gets a direct parse, then every
/// balanced brace-delimited candidate is scanned from the last match
/// backward, since models often restate a corrected answer later in the
/// response and the final JSON-like block should win. Never errors; an
/// unparseable input yields an empty map.
pub fn extract_json_object(raw: &str) -> Map<String, Value> {
    let text = raw.trim();

    if let Some(fenced) = fenced_block_re()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
    {
        if let Some(map) = parse_candidate(fenced) {
            return map;
        }
    }

    parse_candidate(text).unwrap_or_default()
}

/// Direct parse, then the balanced-brace scan, last candidate first.
fn parse_candidate(text: &str) -> Option<Map<String, Value>> {
    if let Some(map) = parse_object(text) {
        return Some(map);
    }
    balanced_brace_spans(text)
        .into_iter()
        .rev()
        .find_map(parse_object)
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Top-level `{...}` spans with brace depth tracked, string contents and
/// escapes skipped.
fn balanced_brace_spans(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            '}' => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        spans.push(&text[start..=i]);
                    }
                }
            }
            _ => {}
        }
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_parse() {
        let map = extract_json_object(r#"{"destination": "Tokyo"}"#);
        assert_eq!(map["destination"], "Tokyo");
    }

    #[test]
    fn test_fenced_block_preferred() {
        let raw = "Here is the result:\n```json\n{\"origin\": \"Delhi\"}\n```\nDone.";
        let map = extract_json_object(raw);
        assert_eq!(map["origin"], "Delhi");
    }

    #[test]
    fn test_untagged_fence() {
        let raw = "```\n{\"days\": 5}\n```";
        let map = extract_json_object(raw);
        assert_eq!(map["days"], 5);
    }

    #[test]
    fn test_last_block_wins() {
        let raw = r#"
            First attempt: {"destination": "Osaka", "days": 3}
            Actually, correcting myself:
            {"destination": "Tokyo", "days": 5}
        "#;
        let map = extract_json_object(raw);
        assert_eq!(map["destination"], "Tokyo");
        assert_eq!(map["days"], 5);
    }

    #[test]
    fn test_invalid_last_block_falls_back_to_earlier() {
        let raw = r#"{"destination": "Tokyo"} and then {broken json}"#;
        let map = extract_json_object(raw);
        assert_eq!(map["destination"], "Tokyo");
    }

    #[test]
    fn test_nested_objects_and_braces_in_strings() {
        let raw = r#"Answer: {"budget": {"amount": 20000, "currency": "INR"}, "note": "use {caution}"}"#;
        let map = extract_json_object(raw);
        assert_eq!(map["budget"]["amount"], 20000);
        assert_eq!(map["note"], "use {caution}");
    }

    #[test]
    fn test_unparseable_fence_falls_back_to_full_text() {
        let raw = "```\nthinking out loud, not JSON\n```\nFinal answer: {\"destination\": \"Tokyo\"}";
        let map = extract_json_object(raw);
        assert_eq!(map["destination"], "Tokyo");
    }

    #[test]
    fn test_parseable_fence_still_preferred_over_trailing_object() {
        let raw = "```json\n{\"destination\": \"Tokyo\"}\n```\nignore {\"destination\": \"Osaka\"}";
        let map = extract_json_object(raw);
        assert_eq!(map["destination"], "Tokyo");
    }

    #[test]
    fn test_no_json_yields_empty_map() {
        assert!(extract_json_object("no structure here").is_empty());
        assert!(extract_json_object("").is_empty());
        assert!(extract_json_object("[1, 2, 3]").is_empty());
    }
}
