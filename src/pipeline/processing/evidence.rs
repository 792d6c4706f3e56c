use std::collections::{BTreeMap, BTreeSet};

use crate::types::{EvidenceQuality, QueryResult, StressTolerance, StressType};

/// Keywords per category, matched as case-insensitive substrings
static CATEGORY_KEYWORDS: [(StressType, &[&str]); 7] = [
    (StressType::Drought, &["drought", "water stress"]),
    (StressType::Heat, &["heat", "temperature stress"]),
    (StressType::Salt, &["salt", "salinity"]),
    (StressType::Flood, &["flood", "water logging"]),
    (StressType::Cold, &["cold", "frost"]),
    (StressType::Disease, &["disease", "pathogen"]),
    (StressType::Pest, &["pest", "insect"]),
];

/// Abiotic terms whose result counts feed the tolerance decision
static ABIOTIC_TERMS: [&str; 5] = ["drought", "heat", "salt", "flood", "cold"];

const HIGH_MIN_RESULTS: u64 = 50;
const HIGH_MIN_SUCCESSFUL: usize = 10;
const MEDIUM_MIN_RESULTS: u64 = 20;
const MEDIUM_MIN_SUCCESSFUL: usize = 5;

/// Everything derived from a record's query log
#[derive(Debug, Clone, PartialEq)]
pub struct Evidence {
    /// Categories with at least one successful matching query, sorted
    pub stress_types: Vec<StressType>,
    /// Successful queries per category
    pub category_hits: BTreeMap<StressType, usize>,
    pub total_results: u64,
    pub successful_queries: usize,
    /// Results summed over queries mentioning an abiotic stress term
    pub stress_results: u64,
    pub quality: EvidenceQuality,
    pub tolerance: StressTolerance,
    pub disease_queries: usize,
    pub pest_queries: usize,
    pub field_trials: usize,
    pub commercial_availability: usize,
}

impl Evidence {
    /// Evidence for a record that has no query log at all.
    pub fn absent(tolerance: StressTolerance) -> Self {
        Self {
            stress_types: Vec::new(),
            category_hits: BTreeMap::new(),
            total_results: 0,
            successful_queries: 0,
            stress_results: 0,
            quality: EvidenceQuality::Low,
            tolerance,
            disease_queries: 0,
            pest_queries: 0,
            field_trials: 0,
            commercial_availability: 0,
        }
    }
}

/// Classify a query log into stress categories and score its breadth.
pub fn extract_evidence(query_results: &[QueryResult]) -> Evidence {
    let mut found = BTreeSet::new();
    let mut category_hits = BTreeMap::new();
    let mut total_results = 0u64;
    let mut successful_queries = 0usize;
    let mut stress_results = 0u64;
    let mut disease_queries = 0usize;
    let mut pest_queries = 0usize;
    let mut field_trials = 0usize;
    let mut commercial_availability = 0usize;

    for result in query_results {
        let query = result.query.to_lowercase();
        total_results = total_results.saturating_add(result.results_count);

        if ABIOTIC_TERMS.iter().any(|term| query.contains(term)) {
            stress_results = stress_results.saturating_add(result.results_count);
        }

        if result.results_count == 0 {
            continue;
        }
        successful_queries += 1;

        for stress in classify_query(&query) {
            found.insert(stress);
            *category_hits.entry(stress).or_insert(0) += 1;
        }

        if query.contains("disease") {
            disease_queries += 1;
        }
        if query.contains("pest") {
            pest_queries += 1;
        }
        if query.contains("trial") {
            field_trials += 1;
        }
        if query.contains("seed") && query.contains("availability") {
            commercial_availability += 1;
        }
    }

    let stress_types: Vec<StressType> = found.into_iter().collect();
    let tolerance = if stress_results > 0 && !stress_types.is_empty() {
        StressTolerance::Yes
    } else {
        StressTolerance::No
    };

    Evidence {
        stress_types,
        category_hits,
        total_results,
        successful_queries,
        stress_results,
        quality: evidence_quality(total_results, successful_queries),
        tolerance,
        disease_queries,
        pest_queries,
        field_trials,
        commercial_availability,
    }
}

/// Categories whose keywords occur in an already lowercased query.
pub fn classify_query(query: &str) -> impl Iterator<Item = StressType> + '_ {
    CATEGORY_KEYWORDS
        .iter()
        .filter(move |(_, keywords)| keywords.iter().any(|k| query.contains(k)))
        .map(|(stress, _)| *stress)
}

/// Tier from result volume and breadth; the first satisfied tier wins.
pub fn evidence_quality(total_results: u64, successful_queries: usize) -> EvidenceQuality {
    if total_results >= HIGH_MIN_RESULTS && successful_queries >= HIGH_MIN_SUCCESSFUL {
        EvidenceQuality::High
    } else if total_results >= MEDIUM_MIN_RESULTS && successful_queries >= MEDIUM_MIN_SUCCESSFUL {
        EvidenceQuality::Medium
    } else {
        EvidenceQuality::Low
    }
}
