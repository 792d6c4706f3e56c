use anyhow::{Context, Result};
use chrono::Local;
use metrics::counter;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, error, info, instrument, warn};

use crate::app::ports::{RecordSinkPort, RecordSourcePort};
use crate::pipeline::processing::normalize::{DefaultNormalizer, Normalizer};
use crate::pipeline::summary::{BuildSummary, RecordStats};
use crate::types::{CanonicalRecord, RawRecord};

/// Use case for compiling loaded batches into the dashboard outputs
pub struct BuildUseCase {
    source: Box<dyn RecordSourcePort>,
    normalizer: Box<dyn Normalizer>,
    sinks: Vec<Box<dyn RecordSinkPort>>,
    progress_interval: usize,
}

/// Records that normalized, plus a diagnostic per skipped record
#[derive(Debug, Default)]
pub struct NormalizedBatch {
    pub records: Vec<CanonicalRecord>,
    pub errors: Vec<String>,
}

/// Normalize raw records in input order, skipping the ones that are not objects
pub fn normalize_records(
    normalizer: &dyn Normalizer,
    raw_records: Vec<Value>,
    progress_interval: usize,
) -> NormalizedBatch {
    let total = raw_records.len();
    let mut batch = NormalizedBatch::default();

    for (i, value) in raw_records.into_iter().enumerate() {
        match RawRecord::from_value(i, value) {
            Ok(raw) => {
                batch.records.push(normalizer.normalize(&raw));
                if progress_interval > 0 && (i + 1) % progress_interval == 0 {
                    info!("Processed {}/{} varieties", i + 1, total);
                }
            }
            Err(e) => {
                error!("Error processing variety {}: {}", i, e);
                batch.errors.push(format!("Error processing variety {i}: {e}"));
            }
        }
    }

    counter!("crop_pipeline_records_processed_total").increment(batch.records.len() as u64);
    counter!("crop_pipeline_record_errors_total").increment(batch.errors.len() as u64);
    batch
}

impl BuildUseCase {
    pub fn new(
        source: Box<dyn RecordSourcePort>,
        normalizer: Box<dyn Normalizer>,
        sinks: Vec<Box<dyn RecordSinkPort>>,
    ) -> Self {
        Self {
            source,
            normalizer,
            sinks,
            progress_interval: 100,
        }
    }

    /// Create a use case with the default normalizer
    pub fn with_default_normalizer(
        source: Box<dyn RecordSourcePort>,
        sinks: Vec<Box<dyn RecordSinkPort>>,
    ) -> Self {
        Self::new(source, Box::new(DefaultNormalizer::default()), sinks)
    }

    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn normalize_batch(&self, raw_records: Vec<Value>) -> NormalizedBatch {
        normalize_records(self.normalizer.as_ref(), raw_records, self.progress_interval)
    }

    /// Stage every output, then commit them all. Any failure discards every
    /// staged file and leaves existing outputs untouched.
    fn write_outputs(&self, records: &[CanonicalRecord]) -> Result<Vec<PathBuf>> {
        for sink in &self.sinks {
            debug!("Staging {} output", sink.name());
            if let Err(e) = sink.stage(records) {
                self.discard_all();
                return Err(e).with_context(|| format!("{} output failed", sink.name()));
            }
        }

        let mut outputs = Vec::with_capacity(self.sinks.len());
        for sink in &self.sinks {
            match sink.commit() {
                Ok(path) => outputs.push(path),
                Err(e) => {
                    self.discard_all();
                    return Err(e).with_context(|| format!("{} output failed", sink.name()));
                }
            }
        }
        Ok(outputs)
    }

    fn discard_all(&self) {
        for sink in &self.sinks {
            sink.discard();
        }
    }

    /// Load, normalize and write. Output failures abort the run.
    #[instrument(skip(self))]
    pub fn run(&self) -> Result<BuildSummary> {
        counter!("crop_pipeline_runs_total").increment(1);

        let load = self.source.load();
        let records_loaded = load.records.len();

        let batch = self.normalize_batch(load.records);
        info!("Successfully processed {} varieties", batch.records.len());
        if !batch.errors.is_empty() {
            warn!("{} varieties skipped", batch.errors.len());
        }

        let outputs = if batch.records.is_empty() {
            warn!("No varieties to write");
            Vec::new()
        } else {
            self.write_outputs(&batch.records)?
        };

        Ok(BuildSummary {
            files_found: load.files_found,
            files_loaded: load.files_loaded,
            load_errors: load.failures,
            records_loaded,
            records_processed: batch.records.len(),
            stats: RecordStats::from_records(&batch.records),
            record_errors: batch.errors,
            outputs,
            completed_at: Local::now(),
        })
    }
}
