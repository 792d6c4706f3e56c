use chrono::{DateTime, Local};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use crate::types::{CanonicalRecord, EvidenceQuality, StressTolerance};

/// Per-category statistics over the records of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStats {
    pub total: usize,
    pub stress_tolerant: usize,
    pub with_registry: usize,
    pub high_evidence: usize,
    pub medium_evidence: usize,
    pub low_evidence: usize,
    pub unique_crops: usize,
}

impl RecordStats {
    pub fn from_records(records: &[CanonicalRecord]) -> Self {
        let mut stats = Self {
            total: records.len(),
            ..Self::default()
        };
        let mut crops = BTreeSet::new();

        for record in records {
            if record.stress_tolerance == StressTolerance::Yes {
                stats.stress_tolerant += 1;
            }
            if record.seednet_available {
                stats.with_registry += 1;
            }
            match record.evidence_quality {
                EvidenceQuality::High => stats.high_evidence += 1,
                EvidenceQuality::Medium => stats.medium_evidence += 1,
                EvidenceQuality::Low => stats.low_evidence += 1,
            }
            crops.insert(record.crop.as_str());
        }

        stats.unique_crops = crops.len();
        stats
    }
}

/// Result of a complete build run
#[derive(Debug)]
pub struct BuildSummary {
    pub files_found: usize,
    pub files_loaded: usize,
    pub load_errors: Vec<String>,
    pub records_loaded: usize,
    pub records_processed: usize,
    pub record_errors: Vec<String>,
    pub stats: RecordStats,
    pub outputs: Vec<PathBuf>,
    pub completed_at: DateTime<Local>,
}

impl BuildSummary {
    pub fn records_skipped(&self) -> usize {
        self.record_errors.len()
    }
}

impl fmt::Display for BuildSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Statistics:")?;
        writeln!(
            f,
            "  Batch files: {} found, {} loaded, {} failed",
            self.files_found,
            self.files_loaded,
            self.load_errors.len()
        )?;
        writeln!(
            f,
            "  Varieties: {} loaded, {} processed, {} skipped",
            self.records_loaded,
            self.records_processed,
            self.records_skipped()
        )?;
        writeln!(f, "  Stress tolerant: {}", self.stats.stress_tolerant)?;
        writeln!(f, "  With registry data: {}", self.stats.with_registry)?;
        writeln!(
            f,
            "  Evidence: {} high, {} medium, {} low",
            self.stats.high_evidence, self.stats.medium_evidence, self.stats.low_evidence
        )?;
        writeln!(f, "  Unique crops: {}", self.stats.unique_crops)?;

        if !self.load_errors.is_empty() || !self.record_errors.is_empty() {
            writeln!(f, "\nErrors encountered:")?;
            for error in self.load_errors.iter().chain(&self.record_errors) {
                writeln!(f, "  - {}", error)?;
            }
        }

        if self.outputs.is_empty() {
            writeln!(f, "\nNo output files written")?;
        } else {
            writeln!(f, "\nOutput files created:")?;
            for path in &self.outputs {
                writeln!(f, "  {}", path.display())?;
            }
        }

        write!(
            f,
            "\nProcessing completed at: {}",
            self.completed_at.format("%Y-%m-%d %H:%M:%S")
        )
    }
}
