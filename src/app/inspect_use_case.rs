use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::app::build_use_case::{normalize_records, NormalizedBatch};
use crate::pipeline::ingestion::BatchLoader;
use crate::pipeline::processing::normalize::Normalizer;

/// Use case for normalizing one batch file without writing any output
pub struct InspectUseCase {
    normalizer: Box<dyn Normalizer>,
}

impl InspectUseCase {
    pub fn new(normalizer: Box<dyn Normalizer>) -> Self {
        Self { normalizer }
    }

    /// Load a single batch file and normalize its records in input order.
    ///
    /// Unlike a build, an unreadable file is an error rather than a skip.
    pub fn run(&self, file: &Path) -> Result<NormalizedBatch> {
        let values = BatchLoader::load_file(file)
            .with_context(|| format!("Failed to load {}", file.display()))?;
        info!("Inspecting {} records from {}", values.len(), file.display());

        Ok(normalize_records(self.normalizer.as_ref(), values, 0))
    }
}
