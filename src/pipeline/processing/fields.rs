//! Ordered-preference resolution of logical attributes.
//!
//! Producers spell the same attribute differently, so every attribute carries
//! its own candidate list. The first key that is present and non-null wins.

use serde_json::{Map, Value};

use crate::constants;

/// Candidate source keys for one logical attribute plus its fallback string
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub candidates: &'static [&'static str],
    pub default: &'static str,
}

pub const VARIETY_NAME: FieldSpec = FieldSpec {
    candidates: &["variety_name", "crop_variety"],
    default: constants::UNKNOWN_VARIETY,
};

pub const CROP_TYPE: FieldSpec = FieldSpec {
    candidates: &["crop_type", "crop"],
    default: constants::UNKNOWN,
};

pub const YEAR_OF_RELEASE: FieldSpec = FieldSpec {
    candidates: &["extracted_year", "year"],
    default: "",
};

pub const STATES: FieldSpec = FieldSpec {
    candidates: &["state_zone", "state_zone_standardized"],
    default: constants::UNKNOWN,
};

pub const SEASON: FieldSpec = FieldSpec {
    candidates: &["season", "crop_season"],
    default: constants::UNKNOWN,
};

pub const MATURITY_DAYS: FieldSpec = FieldSpec {
    candidates: &["maturity_days", "maturity_group"],
    default: constants::UNKNOWN,
};

pub const INSTITUTION: FieldSpec = FieldSpec {
    candidates: &["institution"],
    default: constants::NOT_SPECIFIED,
};

pub const DATA_SOURCE: FieldSpec = FieldSpec {
    candidates: &["data_source"],
    default: constants::DEFAULT_DATA_SOURCE,
};

/// First candidate present and non-null in `fields`.
pub fn resolve<'a>(fields: &'a Map<String, Value>, candidates: &[&str]) -> Option<&'a Value> {
    candidates
        .iter()
        .filter_map(|key| fields.get(*key))
        .find(|value| !value.is_null())
}

/// Resolve a field and render it as text, or return the spec's default.
pub fn resolve_string(fields: &Map<String, Value>, spec: &FieldSpec) -> String {
    resolve(fields, spec.candidates)
        .map(render_scalar)
        .unwrap_or_else(|| spec.default.to_string())
}

/// Release year as text. Empty strings, zero and `false` all read as "no year".
pub fn resolve_year(fields: &Map<String, Value>) -> String {
    match resolve(fields, YEAR_OF_RELEASE.candidates) {
        Some(value) if is_truthy(value) => render_scalar(value),
        _ => YEAR_OF_RELEASE.default.to_string(),
    }
}

/// Text form of a JSON value as it appears in the outputs.
///
/// Integral floats drop their fractional part since spreadsheet exports
/// turn integer columns into floats (`2019.0`).
pub fn render_scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
                    Some(f) => f.to_string(),
                    None => n.to_string(),
                }
            }
        }
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_first_candidate_wins() {
        let data = fields(json!({"crop_variety": "B", "variety_name": "A"}));
        assert_eq!(resolve_string(&data, &VARIETY_NAME), "A");
    }

    #[test]
    fn test_falls_through_to_later_candidate() {
        let data = fields(json!({"crop": "Wheat"}));
        assert_eq!(resolve_string(&data, &CROP_TYPE), "Wheat");
    }

    #[test]
    fn test_null_candidate_is_skipped() {
        let data = fields(json!({"crop_type": null, "crop": "Maize"}));
        assert_eq!(resolve_string(&data, &CROP_TYPE), "Maize");
    }

    #[test]
    fn test_defaults_when_nothing_matches() {
        let data = fields(json!({"unrelated": 1}));
        assert_eq!(resolve_string(&data, &VARIETY_NAME), "Unknown Variety");
        assert_eq!(resolve_string(&data, &CROP_TYPE), "Unknown");
        assert_eq!(resolve_string(&data, &SEASON), "Unknown");
        assert_eq!(resolve_string(&data, &MATURITY_DAYS), "Unknown");
        assert_eq!(resolve_string(&data, &INSTITUTION), "Not specified");
        assert_eq!(resolve_string(&data, &DATA_SOURCE), "enhanced_batch");
        assert_eq!(resolve_year(&data), "");
    }

    #[test]
    fn test_year_prefers_extracted_year() {
        let data = fields(json!({"year": 2015, "extracted_year": 2016}));
        assert_eq!(resolve_year(&data), "2016");
    }

    #[test]
    fn test_year_renders_float_as_integer() {
        let data = fields(json!({"year": 2019.0}));
        assert_eq!(resolve_year(&data), "2019");
    }

    #[test]
    fn test_falsy_year_is_empty() {
        assert_eq!(resolve_year(&fields(json!({"extracted_year": 0}))), "");
        assert_eq!(resolve_year(&fields(json!({"extracted_year": ""}))), "");
    }

    #[test]
    fn test_numeric_maturity_is_rendered() {
        let data = fields(json!({"maturity_group": 120}));
        assert_eq!(resolve_string(&data, &MATURITY_DAYS), "120");
    }

    #[test]
    fn test_render_scalar_variants() {
        assert_eq!(render_scalar(&json!("text")), "text");
        assert_eq!(render_scalar(&json!(true)), "true");
        assert_eq!(render_scalar(&json!(110.5)), "110.5");
        assert_eq!(render_scalar(&json!(-4)), "-4");
        assert_eq!(render_scalar(&json!(["a"])), "[\"a\"]");
    }
}
