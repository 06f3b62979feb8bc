//! Normalisation helpers for loosely typed model output.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.?\d*").expect("static regex is valid"));

/// Values the prompts use (or models invent) for "no information".
const UNSPECIFIED: &[&str] = &[
    "",
    "not specified",
    "none",
    "none specified",
    "n/a",
    "na",
    "null",
    "unknown",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Case {
    Lower,
    Keep,
}

/// Which JSON scalars a list may contribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Items {
    Strings,
    StringsAndNumbers,
}

pub(crate) fn is_unspecified(text: &str) -> bool {
    let lowered = text.trim().to_lowercase();
    UNSPECIFIED.contains(&lowered.as_str())
}

/// Cleans a list field: keeps string (and optionally numeric) items, trims them,
/// applies `case`, and drops items that end up empty. Non-lists become `[]`.
pub(crate) fn string_list(value: Option<&Value>, items: Items, case: Case) -> Vec<String> {
    let Some(Value::Array(entries)) = value else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) if items == Items::StringsAndNumbers && !is_zero(n) => {
                Some(n.to_string())
            }
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .map(|s| match case {
            Case::Lower => s.to_lowercase(),
            Case::Keep => s,
        })
        .collect()
}

/// A free-text scalar, or `None` when it is missing or says "Not Specified".
pub(crate) fn optional_text(value: Option<&Value>, case: Case) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) if !is_zero(n) => n.to_string(),
        _ => return None,
    };
    if is_unspecified(&text) {
        return None;
    }
    Some(match case {
        Case::Lower => text.to_lowercase(),
        Case::Keep => text,
    })
}

/// A numeric field that models sometimes return as prose ("about 5 years").
pub(crate) fn optional_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => first_number(s),
        _ => None,
    }
}

/// The first decimal number in `text` ("3-5 years" gives 3.0).
pub fn first_number(text: &str) -> Option<f64> {
    FIRST_NUMBER
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

fn is_zero(n: &serde_json::Number) -> bool {
    n.as_f64() == Some(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_list_filters_and_lowercases() {
        let value = json!(["  Rust ", "", 42, null, {"k": "v"}, "SQL"]);
        assert_eq!(
            string_list(Some(&value), Items::Strings, Case::Lower),
            vec!["rust", "sql"]
        );
        assert_eq!(
            string_list(Some(&value), Items::StringsAndNumbers, Case::Lower),
            vec!["rust", "42", "sql"]
        );
    }

    #[test]
    fn test_string_list_keeps_case_when_asked() {
        let value = json!(["Led the Platform Team"]);
        assert_eq!(
            string_list(Some(&value), Items::Strings, Case::Keep),
            vec!["Led the Platform Team"]
        );
    }

    #[test]
    fn test_string_list_non_list_is_empty() {
        assert!(string_list(Some(&json!("rust, sql")), Items::Strings, Case::Lower).is_empty());
        assert!(string_list(None, Items::Strings, Case::Lower).is_empty());
    }

    #[test]
    fn test_optional_text_treats_not_specified_as_missing() {
        assert_eq!(optional_text(Some(&json!("Not Specified")), Case::Lower), None);
        assert_eq!(optional_text(Some(&json!("  N/A ")), Case::Lower), None);
        assert_eq!(
            optional_text(Some(&json!("Bachelor's Degree")), Case::Lower),
            Some("bachelor's degree".to_string())
        );
        assert_eq!(optional_text(Some(&json!(5)), Case::Keep), Some("5".to_string()));
        assert_eq!(optional_text(Some(&json!(["x"])), Case::Keep), None);
    }

    #[test]
    fn test_optional_number_reads_prose() {
        assert_eq!(optional_number(Some(&json!(4))), Some(4.0));
        assert_eq!(optional_number(Some(&json!("about 6.5 years"))), Some(6.5));
        assert_eq!(optional_number(Some(&json!("several years"))), None);
        assert_eq!(optional_number(Some(&json!(null))), None);
    }

    #[test]
    fn test_first_number_takes_lower_bound_of_range() {
        assert_eq!(first_number("3-5 years"), Some(3.0));
        assert_eq!(first_number("minimum of 10+ years"), Some(10.0));
        assert_eq!(first_number("no number"), None);
    }
}
