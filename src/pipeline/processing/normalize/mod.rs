use serde_json::Value;
use std::collections::BTreeMap;

use crate::config::MissingEvidencePolicy;
use crate::constants;
use crate::pipeline::processing::evidence::{extract_evidence, Evidence};
use crate::pipeline::processing::fields::{self, resolve_string, resolve_year};
use crate::pipeline::processing::states::normalize_state_value;
use crate::types::{
    BasicInfo, CanonicalRecord, DiseasePestResistance, HitCount, RawRecord, ResearchData,
};

/// Trait for turning raw producer records into canonical records
pub trait Normalizer {
    /// Total: every field degrades to a documented default instead of failing
    fn normalize(&self, record: &RawRecord) -> CanonicalRecord;
}

/// Normalizer for enhanced batch records (nested or flat layout)
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNormalizer {
    /// Tolerance for records without any query log
    pub missing_evidence: MissingEvidencePolicy,
}

/// Registry lookup extracted from a record
#[derive(Debug, Clone, PartialEq, Default)]
struct RegistryMatch {
    available: bool,
    url: String,
    variety_id: String,
    fields: BTreeMap<String, Value>,
}

impl DefaultNormalizer {
    pub fn new(missing_evidence: MissingEvidencePolicy) -> Self {
        Self { missing_evidence }
    }

    fn extract_evidence(&self, record: &RawRecord) -> Evidence {
        match record.query_results() {
            Some(results) => extract_evidence(&results),
            None => Evidence::absent(self.missing_evidence.tolerance()),
        }
    }

    /// A registry match needs a non-empty variety id; URL and id are copied either way.
    /// A match without a source URL points at the registry's detail page.
    fn extract_registry(&self, record: &RawRecord) -> RegistryMatch {
        let data = record.registry_fields();

        let variety_id = data
            .get(constants::REGISTRY_ID_KEY)
            .map(fields::render_scalar)
            .unwrap_or_default();
        let available = !variety_id.is_empty();
        let url = data
            .get(constants::REGISTRY_URL_KEY)
            .map(fields::render_scalar)
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| {
                if available {
                    format!("{}{}", constants::REGISTRY_DETAIL_URL, variety_id)
                } else {
                    String::new()
                }
            });

        let stripped = if available {
            data.iter()
                .filter_map(|(key, value)| {
                    key.strip_prefix(constants::REGISTRY_PREFIX)
                        .map(|clean| (clean.to_string(), value.clone()))
                })
                .collect()
        } else {
            BTreeMap::new()
        };

        RegistryMatch {
            available,
            url,
            variety_id,
            fields: stripped,
        }
    }

    /// Free-text assessment from an upstream analysis pass, if any
    fn extract_notes(&self, record: &RawRecord) -> String {
        record
            .get("analysis_result")
            .and_then(|v| v.get("variety_analysis"))
            .and_then(|v| v.get("overall_assessment"))
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(constants::NO_ANALYSIS)
            .to_string()
    }

    fn build_research_data(&self, basic_info: BasicInfo, evidence: &Evidence) -> ResearchData {
        ResearchData {
            basic_info,
            search_results_summary: evidence.total_results,
            stress_tolerance_evidence: evidence
                .stress_types
                .iter()
                .map(|stress| {
                    let hits = evidence.category_hits.get(stress).copied().unwrap_or(0);
                    (stress.to_string(), hits)
                })
                .collect(),
            disease_pest_resistance: DiseasePestResistance {
                disease: HitCount {
                    count: evidence.disease_queries,
                },
                pest: HitCount {
                    count: evidence.pest_queries,
                },
            },
            field_trials: evidence.field_trials,
            commercial_availability: evidence.commercial_availability,
            enhancement_features: constants::ENHANCEMENT_FEATURES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Normalizer for DefaultNormalizer {
    fn normalize(&self, record: &RawRecord) -> CanonicalRecord {
        let data = record.fields();

        // Identity
        let variety_name = resolve_string(data, &fields::VARIETY_NAME);
        let crop = resolve_string(data, &fields::CROP_TYPE);
        let year_of_release = resolve_year(data);
        let variety_id = record
            .get("variety_id")
            .filter(|v| !v.is_null())
            .map(fields::render_scalar)
            .unwrap_or_else(|| format!("{}_{}_{}", crop, variety_name, year_of_release));

        // Geography
        let states = normalize_state_value(fields::resolve(data, fields::STATES.candidates));
        let primary_state = states
            .first()
            .cloned()
            .unwrap_or_else(|| constants::UNKNOWN.to_string());
        let states_acronyms = if states.is_empty() {
            constants::UNKNOWN.to_string()
        } else {
            states.join(", ")
        };

        // Classification
        let evidence = self.extract_evidence(record);
        let key_attributes = if evidence.stress_types.is_empty() {
            constants::STANDARD_VARIETY.to_string()
        } else {
            evidence
                .stress_types
                .iter()
                .map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };

        // Provenance
        let registry = self.extract_registry(record);
        let basic_info = BasicInfo {
            crop: crop.clone(),
            variety_name: variety_name.clone(),
            data_source: resolve_string(data, &fields::DATA_SOURCE),
            year: year_of_release.clone(),
            institution: resolve_string(data, &fields::INSTITUTION),
        };
        let research_data = self.build_research_data(basic_info, &evidence);

        CanonicalRecord {
            variety_id,
            crop,
            variety_name,
            year_of_release,
            stress_tolerance: evidence.tolerance,
            key_attributes,
            states,
            primary_state,
            states_acronyms,
            seasons: resolve_string(data, &fields::SEASON),
            days_to_maturity: resolve_string(data, &fields::MATURITY_DAYS),
            evidence_quality: evidence.quality,
            stress_types: evidence.stress_types,
            seednet_match: (if registry.available { "YES" } else { "NO" }).to_string(),
            seednet_available: registry.available,
            seednet_url: registry.url,
            seednet_variety_id: registry.variety_id,
            seednet_fields: registry.fields,
            notes: self.extract_notes(record),
            research_data,
            search_metadata: record.search_metadata_value(),
        }
    }
}
