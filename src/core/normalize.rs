use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::core::dates;
use crate::core::fields::is_missing_value;
use crate::core::value::FieldValue;

fn digit_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").unwrap())
}

/// Extract a positive integer from loose text.
///
/// Deliberate simplification carried over from the source behavior: the first
/// run of digits wins and any sign or decimal point is discarded, so
/// `"3.5 days"` yields 3 and `"-2"` yields 2. Returns `None` when no digits
/// are present or the run parses to zero.
pub fn parse_positive_int(text: &str) -> Option<u64> {
    let run = digit_run_re().find(text)?;
    let parsed = run.as_str().parse::<u64>().ok()?;
    if parsed > 0 {
        Some(parsed)
    } else {
        None
    }
}

/// Integer-with-validation normalizer for `days` / `num_people`.
/// Canonical decimal string, or empty when absent or non-positive.
pub fn normalize_count(value: &FieldValue) -> String {
    match value {
        FieldValue::Missing => String::new(),
        FieldValue::Number(n) if n.fract() == 0.0 && *n > 0.0 => format!("{}", *n as u64),
        other => {
            let text = render_for_parsing(other);
            parse_positive_int(&text)
                .map(|n| n.to_string())
                .unwrap_or_default()
        }
    }
}

/// Stringify, trim, and map missing-sentinel values to empty.
pub fn clean_text(value: &FieldValue) -> String {
    let text = match value {
        FieldValue::Missing => return String::new(),
        other => render_for_parsing(other),
    };
    let trimmed = text.trim();
    if is_missing_value(trimmed) {
        String::new()
    } else {
        trimmed.to_string()
    }
}

/// Interests may arrive as a list; clean each entry, drop empties, and join
/// with `", "`. Any other shape goes through the text cleaner.
pub fn normalize_interests(value: &FieldValue) -> String {
    match value {
        FieldValue::List(items) => {
            let cleaned: Vec<String> = items
                .iter()
                .map(clean_text)
                .filter(|entry| !entry.is_empty())
                .collect();
            cleaned.join(", ")
        }
        other => clean_text(other),
    }
}

/// Budget may arrive as `{"amount": ..., "currency": ...}`; recombine into
/// `"{amount} {currency}"`. Numeric-ness of the amount is not checked here,
/// the budget-format validator covers that during solicitation.
pub fn normalize_budget(value: &FieldValue) -> String {
    match value {
        FieldValue::Map(map) => {
            let amount = map
                .get("amount")
                .map(|v| clean_text(&FieldValue::from(v)))
                .unwrap_or_default();
            if amount.is_empty() {
                return String::new();
            }
            let currency = map
                .get("currency")
                .map(|v| clean_text(&FieldValue::from(v)))
                .unwrap_or_default();
            if currency.is_empty() {
                amount
            } else {
                format!("{} {}", amount, currency)
            }
        }
        other => clean_text(other),
    }
}

/// Parse the first 10 characters as `YYYY-MM-DD`; absent on any mismatch.
pub fn normalize_date(value: &FieldValue) -> String {
    let text = clean_text(value);
    if text.is_empty() {
        return String::new();
    }
    let head: String = text.chars().take(10).collect();
    if dates::parse_iso_date(&head).is_some() {
        head
    } else {
        String::new()
    }
}

/// True iff the trimmed string parses exactly as `YYYY-MM-DD`.
pub fn is_iso_date(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.chars().count() == 10 && dates::parse_iso_date(trimmed).is_some()
}

/// True iff the string carries at least one digit. Intentionally permissive:
/// amount presence only, no currency requirement.
pub fn budget_has_amount(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}

fn render_for_parsing(value: &FieldValue) -> String {
    value.render_scalar().unwrap_or_else(|| match value {
        FieldValue::List(items) => {
            let rendered: Vec<String> = items.iter().map(render_for_parsing).collect();
            rendered.join(", ")
        }
        FieldValue::Map(map) => Value::Object(map.clone()).to_string(),
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_positive_int_first_digit_run() {
        assert_eq!(parse_positive_int("4"), Some(4));
        assert_eq!(parse_positive_int("about 12 days"), Some(12));
        assert_eq!(parse_positive_int("3.5 days"), Some(3));
        assert_eq!(parse_positive_int("-2"), Some(2));
        assert_eq!(parse_positive_int("0"), None);
        assert_eq!(parse_positive_int("soon"), None);
        assert_eq!(parse_positive_int(""), None);
    }

    #[test]
    fn test_normalize_count() {
        assert_eq!(normalize_count(&FieldValue::Number(2.0)), "2");
        assert_eq!(normalize_count(&FieldValue::Number(-1.0)), "1");
        assert_eq!(normalize_count(&FieldValue::from("two")), "");
        assert_eq!(normalize_count(&FieldValue::from("2 adults")), "2");
        assert_eq!(normalize_count(&FieldValue::Missing), "");
    }

    #[test]
    fn test_clean_text_sentinels() {
        assert_eq!(clean_text(&FieldValue::from("  Tokyo  ")), "Tokyo");
        assert_eq!(clean_text(&FieldValue::from("None")), "");
        assert_eq!(clean_text(&FieldValue::from("n/a")), "");
        assert_eq!(clean_text(&FieldValue::Missing), "");
        assert_eq!(clean_text(&FieldValue::Number(3.0)), "3");
    }

    #[test]
    fn test_normalize_interests() {
        let list = FieldValue::from(json!(["Culture", " ", "none", "Food"]));
        assert_eq!(normalize_interests(&list), "Culture, Food");
        assert_eq!(normalize_interests(&FieldValue::from("hiking")), "hiking");
        assert_eq!(normalize_interests(&FieldValue::Missing), "");
    }

    #[test]
    fn test_normalize_budget_map() {
        let both = FieldValue::from(json!({"amount": 20000, "currency": "INR"}));
        assert_eq!(normalize_budget(&both), "20000 INR");

        let amount_only = FieldValue::from(json!({"amount": "1500"}));
        assert_eq!(normalize_budget(&amount_only), "1500");

        let empty = FieldValue::from(json!({"currency": "INR"}));
        assert_eq!(normalize_budget(&empty), "");

        assert_eq!(normalize_budget(&FieldValue::from("20000 INR")), "20000 INR");
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date(&FieldValue::from("2026-03-01")), "2026-03-01");
        assert_eq!(
            normalize_date(&FieldValue::from("2026-03-01T10:00:00Z")),
            "2026-03-01"
        );
        assert_eq!(normalize_date(&FieldValue::from("March 1st")), "");
        assert_eq!(normalize_date(&FieldValue::from("2026-13-01")), "");
        assert_eq!(normalize_date(&FieldValue::Missing), "");
    }

    #[test]
    fn test_is_iso_date() {
        assert!(is_iso_date("2026-03-01"));
        assert!(is_iso_date("  2026-03-01  "));
        assert!(!is_iso_date("2026-3-1"));
        assert!(!is_iso_date("2026-02-30"));
        assert!(!is_iso_date("2026-03-01T00"));
    }

    #[test]
    fn test_budget_has_amount() {
        assert!(budget_has_amount("₹15,000"));
        assert!(budget_has_amount("about 2000"));
        assert!(!budget_has_amount("a lot"));
        assert!(!budget_has_amount(""));
    }
}
