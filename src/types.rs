use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants;
use crate::error::{json_kind, PipelineError, Result};

/// One variety record as an upstream producer emitted it.
///
/// Producers disagree on layout: the enhanced batches nest identity fields under
/// `original_data`, the query log under `search_metadata` and registry lookups
/// under `seednet_fields`, while flat exports keep every key at the top level.
/// The section accessors fall back to the record itself when a section is absent.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    data: Map<String, Value>,
}

impl RawRecord {
    /// Wrap a decoded JSON value. Anything other than an object is a record error.
    pub fn from_value(index: usize, value: Value) -> Result<Self> {
        match value {
            Value::Object(data) => Ok(Self { data }),
            other => Err(PipelineError::RecordShape {
                index,
                found: json_kind(&other).to_string(),
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Identity fields: `original_data` or the record itself.
    pub fn fields(&self) -> &Map<String, Value> {
        self.section(constants::ORIGINAL_DATA_KEY)
    }

    /// Registry lookup fields: `seednet_fields` or the record itself.
    pub fn registry_fields(&self) -> &Map<String, Value> {
        self.section(constants::REGISTRY_FIELDS_KEY)
    }

    pub fn search_metadata(&self) -> Option<&Map<String, Value>> {
        self.data
            .get(constants::SEARCH_METADATA_KEY)
            .and_then(|v| v.as_object())
    }

    /// The query log, or `None` when the record carries no search metadata at all.
    pub fn query_results(&self) -> Option<Vec<QueryResult>> {
        let raw = self
            .search_metadata()
            .and_then(|meta| meta.get(constants::QUERY_RESULTS_KEY))
            .or_else(|| self.data.get(constants::QUERY_RESULTS_KEY))?;

        raw.as_array()
            .map(|items| items.iter().map(QueryResult::from_value).collect())
    }

    /// Search metadata as it should be passed through to structured output.
    pub fn search_metadata_value(&self) -> Value {
        if let Some(meta) = self.search_metadata() {
            return Value::Object(meta.clone());
        }
        let mut meta = Map::new();
        if let Some(results) = self.data.get(constants::QUERY_RESULTS_KEY) {
            meta.insert(constants::QUERY_RESULTS_KEY.to_string(), results.clone());
        }
        Value::Object(meta)
    }

    fn section(&self, key: &str) -> &Map<String, Value> {
        self.data
            .get(key)
            .and_then(|v| v.as_object())
            .unwrap_or(&self.data)
    }
}

/// One search probe and how many documents it matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    pub query: String,
    pub results_count: u64,
}

impl QueryResult {
    pub fn new(query: impl Into<String>, results_count: u64) -> Self {
        Self {
            query: query.into(),
            results_count,
        }
    }

    /// Lenient decode: a missing query reads as empty, a missing or malformed count as 0.
    pub fn from_value(value: &Value) -> Self {
        let query = value
            .get("query")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let results_count = value.get("results_count").map(count_from_value).unwrap_or(0);
        Self { query, results_count }
    }
}

fn count_from_value(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Fixed stress vocabulary. Declaration order is alphabetical so the derived
/// `Ord` sorts labels lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum StressType {
    Cold,
    Disease,
    Drought,
    Flood,
    Heat,
    Pest,
    Salt,
}

impl StressType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cold => "Cold",
            Self::Disease => "Disease",
            Self::Drought => "Drought",
            Self::Flood => "Flood",
            Self::Heat => "Heat",
            Self::Pest => "Pest",
            Self::Salt => "Salt",
        }
    }
}

impl fmt::Display for StressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StressTolerance {
    Yes,
    No,
    Unknown,
}

impl StressTolerance {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for StressTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum EvidenceQuality {
    Low,
    Medium,
    High,
}

impl EvidenceQuality {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for EvidenceQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The normalized, fixed-schema record handed to the writers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalRecord {
    pub variety_id: String,
    pub crop: String,
    pub variety_name: String,
    pub year_of_release: String,
    pub stress_tolerance: StressTolerance,
    pub key_attributes: String,
    pub states: Vec<String>,
    pub primary_state: String,
    pub states_acronyms: String,
    pub seasons: String,
    pub days_to_maturity: String,
    pub evidence_quality: EvidenceQuality,
    pub stress_types: Vec<StressType>,
    pub seednet_match: String,
    pub seednet_available: bool,
    pub seednet_url: String,
    pub seednet_variety_id: String,
    pub seednet_fields: BTreeMap<String, Value>,
    pub notes: String,
    pub research_data: ResearchData,
    pub search_metadata: Value,
}

impl CanonicalRecord {
    /// Stress types joined with `|` as the tabular output expects
    pub fn stress_types_list(&self) -> String {
        self.stress_types
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join("|")
    }
}

/// Nested evidence summary consumed by the dashboard detail view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResearchData {
    pub basic_info: BasicInfo,
    pub search_results_summary: u64,
    pub stress_tolerance_evidence: BTreeMap<String, usize>,
    pub disease_pest_resistance: DiseasePestResistance,
    pub field_trials: usize,
    pub commercial_availability: usize,
    pub enhancement_features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicInfo {
    pub crop: String,
    pub variety_name: String,
    pub data_source: String,
    pub year: String,
    pub institution: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiseasePestResistance {
    pub disease: HitCount,
    pub pest: HitCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HitCount {
    pub count: usize,
}
