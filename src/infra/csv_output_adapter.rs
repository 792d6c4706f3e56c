use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use super::staged_file::StagedFile;
use crate::app::ports::RecordSinkPort;
use crate::constants::CSV_COLUMNS;
use crate::error::Result;
use crate::types::CanonicalRecord;

/// Flat one-row-per-variety CSV for the dashboard table
pub struct CsvOutputAdapter {
    file: StagedFile,
}

impl CsvOutputAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: StagedFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.destination()
    }
}

impl RecordSinkPort for CsvOutputAdapter {
    fn name(&self) -> &str {
        "csv"
    }

    fn stage(&self, records: &[CanonicalRecord]) -> Result<()> {
        let mut writer = self.file.create()?;

        info!("Writing {} varieties to {}", records.len(), self.path().display());

        write_line(&mut writer, CSV_COLUMNS.iter().copied()).map_err(|e| self.file.output_error(e))?;
        for record in records {
            let row = csv_row(record);
            write_line(&mut writer, row.iter().map(String::as_str))
                .map_err(|e| self.file.output_error(e))?;
        }
        writer.flush().map_err(|e| self.file.output_error(e))
    }

    fn commit(&self) -> Result<PathBuf> {
        self.file.commit()
    }

    fn discard(&self) {
        self.file.discard()
    }
}

/// Cell values of one record in `CSV_COLUMNS` order
pub fn csv_row(record: &CanonicalRecord) -> [String; 17] {
    [
        record.variety_id.clone(),
        record.crop.clone(),
        record.variety_name.clone(),
        record.year_of_release.clone(),
        record.stress_tolerance.to_string(),
        record.key_attributes.clone(),
        record.states_acronyms.clone(),
        record.seasons.clone(),
        record.days_to_maturity.clone(),
        record.evidence_quality.to_string(),
        record.stress_types_list(),
        record.seednet_match.clone(),
        record.seednet_url.clone(),
        record.seednet_variety_id.clone(),
        record.research_data.search_results_summary.to_string(),
        record.research_data.basic_info.institution.clone(),
        record.research_data.basic_info.data_source.clone(),
    ]
}

fn write_line<'a, W: Write>(writer: &mut W, cells: impl Iterator<Item = &'a str>) -> std::io::Result<()> {
    let line = cells.map(csv_escape).collect::<Vec<_>>().join(",");
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\r\n")
}

pub fn csv_escape(s: &str) -> String {
    if s.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
