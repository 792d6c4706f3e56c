/// Defaults and fixed vocabulary shared across the pipeline

// Input discovery
pub const DEFAULT_DATA_DIR: &str = "enhanced_data";
pub const DEFAULT_FILE_PATTERN: &str = r"^enhanced_batch_.*\.json$";

// Output locations
pub const DEFAULT_CSV_OUTPUT: &str = "varieties_compiled_enhanced.csv";
pub const DEFAULT_JSON_OUTPUT: &str = "varieties_complete.json";
pub const DEFAULT_CONFIG_FILE: &str = "pipeline.toml";

// Nested sections of an enhanced batch record
pub const ORIGINAL_DATA_KEY: &str = "original_data";
pub const SEARCH_METADATA_KEY: &str = "search_metadata";
pub const QUERY_RESULTS_KEY: &str = "query_results";
pub const REGISTRY_FIELDS_KEY: &str = "seednet_fields";
pub const AGGREGATE_RECORDS_KEY: &str = "varieties";

// Registry fields arrive prefixed by the producer that fetched them
pub const REGISTRY_PREFIX: &str = "seednet_raw_";
pub const REGISTRY_ID_KEY: &str = "seednet_raw_variety_id";
pub const REGISTRY_URL_KEY: &str = "seednet_raw_source_url";
/// Detail page of a registry variety; the variety id is appended
pub const REGISTRY_DETAIL_URL: &str =
    "https://seednet.gov.in/SeedVarieties/ssrsVarietydetail.aspx?varietycd=";

// Region sentinel dropped before abbreviation
pub const STATE_SENTINEL: &str = "Not Specified";
pub const MAX_STATES: usize = 5;

// Default strings for missing values
pub const UNKNOWN: &str = "Unknown";
pub const UNKNOWN_VARIETY: &str = "Unknown Variety";
pub const NOT_SPECIFIED: &str = "Not specified";
pub const DEFAULT_DATA_SOURCE: &str = "enhanced_batch";
pub const STANDARD_VARIETY: &str = "Standard variety";
pub const NO_ANALYSIS: &str = "No detailed analysis available";

pub const ENHANCEMENT_FEATURES: [&str; 3] = [
    "AI-Enhanced Search",
    "Multi-query Analysis",
    "Stress Tolerance Detection",
];

/// Column order of the tabular output. Downstream readers index by name or position.
pub const CSV_COLUMNS: [&str; 17] = [
    "variety_id",
    "crop",
    "variety_name",
    "year_of_release",
    "stress_tolerance",
    "key_attributes",
    "states_acronyms",
    "seasons",
    "days_to_maturity",
    "evidence_quality",
    "stress_types_list",
    "seednet_match",
    "seednet_url",
    "seednet_variety_id",
    "search_results_total",
    "institution",
    "data_source",
];
