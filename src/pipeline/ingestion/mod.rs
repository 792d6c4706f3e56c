// Pipeline ingestion: batch file discovery, NaN sanitizing and parsing

use metrics::counter;
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::app::ports::RecordSourcePort;
use crate::constants;
use crate::error::{json_kind, PipelineError, Result};

/// Records gathered from every readable batch file, plus what went wrong
#[derive(Debug, Default)]
pub struct LoadReport {
    pub files_found: usize,
    pub files_loaded: usize,
    /// One diagnostic per skipped source
    pub failures: Vec<String>,
    pub records: Vec<Value>,
}

/// Loads enhanced batch files from a data directory
pub struct BatchLoader {
    data_dir: PathBuf,
    pattern: Regex,
}

impl BatchLoader {
    pub fn new(data_dir: impl Into<PathBuf>, file_pattern: &str) -> Result<Self> {
        Ok(Self {
            data_dir: data_dir.into(),
            pattern: Regex::new(file_pattern)?,
        })
    }

    /// Batch files in the data directory, sorted by file name
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.data_dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let matches = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| self.pattern.is_match(n))
                .unwrap_or(false);
            if matches {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Read and parse one batch file.
    pub fn load_file(path: &Path) -> Result<Vec<Value>> {
        let content = fs::read_to_string(path)?;
        parse_batch(path, &content)
    }
}

impl RecordSourcePort for BatchLoader {
    fn load(&self) -> LoadReport {
        let mut report = LoadReport::default();

        let files = match self.discover() {
            Ok(files) => files,
            Err(e) => {
                let msg = format!("Cannot list data directory {}: {}", self.data_dir.display(), e);
                error!("{}", msg);
                report.failures.push(msg);
                return report;
            }
        };

        report.files_found = files.len();
        info!("Found {} batch files in {}", files.len(), self.data_dir.display());

        for path in files {
            debug!("Loading {}", path.display());
            match Self::load_file(&path) {
                Ok(records) => {
                    info!("Loaded {} records from {}", records.len(), path.display());
                    report.files_loaded += 1;
                    report.records.extend(records);
                }
                Err(e) => {
                    let msg = format!("Error loading {}: {}", path.display(), e);
                    warn!("{}", msg);
                    counter!("crop_pipeline_load_errors_total").increment(1);
                    report.failures.push(msg);
                }
            }
        }

        counter!("crop_pipeline_records_loaded_total").increment(report.records.len() as u64);
        info!("Total records loaded: {}", report.records.len());
        report
    }
}

/// Parse batch file content into its records.
///
/// Accepts a JSON array of records, an object wrapping them under `varieties`,
/// or a single record object.
pub fn parse_batch(path: &Path, content: &str) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_str(&sanitize_nan(content))?;
    match value {
        Value::Array(records) => Ok(records),
        Value::Object(mut map) => match map.remove(constants::AGGREGATE_RECORDS_KEY) {
            Some(Value::Array(records)) => Ok(records),
            Some(other) => Err(PipelineError::UnexpectedShape {
                path: path.to_path_buf(),
                found: format!("'{}' holding {}", constants::AGGREGATE_RECORDS_KEY, json_kind(&other)),
            }),
            None => Ok(vec![Value::Object(map)]),
        },
        other => Err(PipelineError::UnexpectedShape {
            path: path.to_path_buf(),
            found: json_kind(&other).to_string(),
        }),
    }
}

/// Replace bare `NaN` tokens with `null`. Text inside string literals is left alone.
pub fn sanitize_nan(content: &str) -> Cow<'_, str> {
    if !content.contains("NaN") {
        return Cow::Borrowed(content);
    }

    let bytes = content.as_bytes();
    let mut out = String::with_capacity(content.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut last = 0;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            i += 1;
        } else if b == b'"' {
            in_string = true;
            i += 1;
        } else if bytes[i..].starts_with(b"NaN")
            && !bytes.get(i + 3).copied().is_some_and(is_word_byte)
            && (i == 0 || !is_word_byte(bytes[i - 1]))
        {
            out.push_str(&content[last..i]);
            out.push_str("null");
            i += 3;
            last = i;
        } else {
            i += 1;
        }
    }

    out.push_str(&content[last..]);
    Cow::Owned(out)
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
