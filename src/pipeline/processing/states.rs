use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;

use crate::constants::{MAX_STATES, STATE_SENTINEL};

/// Full state and union territory names to their two-letter codes
static STATE_ABBREVIATIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Andhra Pradesh", "AP"),
        ("Arunachal Pradesh", "AR"),
        ("Assam", "AS"),
        ("Bihar", "BR"),
        ("Chhattisgarh", "CG"),
        ("Goa", "GA"),
        ("Gujarat", "GJ"),
        ("Haryana", "HR"),
        ("Himachal Pradesh", "HP"),
        ("Jharkhand", "JH"),
        ("Karnataka", "KA"),
        ("Kerala", "KL"),
        ("Madhya Pradesh", "MP"),
        ("Maharashtra", "MH"),
        ("Manipur", "MN"),
        ("Meghalaya", "ML"),
        ("Mizoram", "MZ"),
        ("Nagaland", "NL"),
        ("Odisha", "OR"),
        ("Punjab", "PB"),
        ("Rajasthan", "RJ"),
        ("Sikkim", "SK"),
        ("Tamil Nadu", "TN"),
        ("Telangana", "TG"),
        ("Tripura", "TR"),
        ("Uttar Pradesh", "UP"),
        ("Uttarakhand", "UK"),
        ("West Bengal", "WB"),
        ("Delhi", "DL"),
        ("Puducherry", "PY"),
        ("Jammu and Kashmir", "JK"),
        ("Ladakh", "LA"),
    ])
});

/// Abbreviate a comma-separated list of region names, keeping at most five.
pub fn normalize_states(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != STATE_SENTINEL)
        .map(abbreviate)
        .take(MAX_STATES)
        .collect()
}

/// Same as [`normalize_states`] for an arbitrary JSON value; non-strings yield nothing.
pub fn normalize_state_value(raw: Option<&Value>) -> Vec<String> {
    match raw {
        Some(Value::String(s)) => normalize_states(s),
        _ => Vec::new(),
    }
}

/// Known names map through the table; anything else becomes its first three letters.
pub fn abbreviate(name: &str) -> String {
    match STATE_ABBREVIATIONS.get(name) {
        Some(code) => (*code).to_string(),
        None => name.chars().take(3).collect::<String>().to_uppercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_known_states_are_abbreviated() {
        assert_eq!(normalize_states("Punjab, Haryana"), vec!["PB", "HR"]);
        assert_eq!(normalize_states("Jammu and Kashmir"), vec!["JK"]);
    }

    #[test]
    fn test_sentinel_and_blanks_are_dropped() {
        assert_eq!(
            normalize_states(" Punjab ,, Not Specified, Haryana ,"),
            vec!["PB", "HR"]
        );
        assert!(normalize_states("Not Specified").is_empty());
        assert!(normalize_states("").is_empty());
    }

    #[test]
    fn test_unmapped_name_uses_three_letter_prefix() {
        assert_eq!(normalize_states("Atlantis"), vec!["ATL"]);
        assert_eq!(normalize_states("NE"), vec!["NE"]);
    }

    #[test]
    fn test_truncates_to_five_in_order() {
        let raw = "Assam, Bihar, Goa, Kerala, Punjab, Sikkim, Tripura";
        assert_eq!(normalize_states(raw), vec!["AS", "BR", "GA", "KL", "PB"]);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        // Lowercase names miss the table and take the prefix fallback
        assert_eq!(normalize_states("punjab"), vec!["PUN"]);
    }

    #[test]
    fn test_non_string_value_yields_empty() {
        assert!(normalize_state_value(None).is_empty());
        assert!(normalize_state_value(Some(&json!(null))).is_empty());
        assert!(normalize_state_value(Some(&json!(["Punjab"]))).is_empty());
        assert_eq!(normalize_state_value(Some(&json!("Goa"))), vec!["GA"]);
    }

    #[test]
    fn test_table_has_all_entries() {
        assert_eq!(STATE_ABBREVIATIONS.len(), 32);
    }
}
