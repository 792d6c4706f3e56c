use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use super::staged_file::StagedFile;
use crate::app::ports::RecordSinkPort;
use crate::error::Result;
use crate::types::CanonicalRecord;

/// Complete records, nested sections included, as one pretty-printed JSON array
pub struct JsonOutputAdapter {
    file: StagedFile,
}

impl JsonOutputAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: StagedFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.destination()
    }
}

impl RecordSinkPort for JsonOutputAdapter {
    fn name(&self) -> &str {
        "json"
    }

    fn stage(&self, records: &[CanonicalRecord]) -> Result<()> {
        let mut writer = self.file.create()?;

        info!("Writing complete data to {}", self.path().display());

        serde_json::to_writer_pretty(&mut writer, records)
            .map_err(|e| self.file.output_error(e.into()))?;
        writer.flush().map_err(|e| self.file.output_error(e))
    }

    fn commit(&self) -> Result<PathBuf> {
        self.file.commit()
    }

    fn discard(&self) {
        self.file.discard()
    }
}
