use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::constants;
use crate::error::{PipelineError, Result};
use crate::types::StressTolerance;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub processing: ProcessingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub data_dir: PathBuf,
    /// Regex matched against file names inside `data_dir`
    pub file_pattern: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub csv_path: PathBuf,
    pub json_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Log a progress line every N records; 0 disables it
    pub progress_interval: usize,
    pub missing_evidence: MissingEvidencePolicy,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: PathBuf,
    pub file_name: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(constants::DEFAULT_DATA_DIR),
            file_pattern: constants::DEFAULT_FILE_PATTERN.to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(constants::DEFAULT_CSV_OUTPUT),
            json_path: PathBuf::from(constants::DEFAULT_JSON_OUTPUT),
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            progress_interval: 100,
            missing_evidence: MissingEvidencePolicy::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            file_name: "pipeline.log".to_string(),
        }
    }
}

/// Values given on the command line; each one set replaces the file's value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub csv_path: Option<PathBuf>,
    pub json_path: Option<PathBuf>,
    pub missing_evidence: Option<MissingEvidencePolicy>,
}

/// Tolerance assigned to records that carry no query log at all.
///
/// One policy applies to a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingEvidencePolicy {
    #[default]
    No,
    Unknown,
}

impl MissingEvidencePolicy {
    pub fn tolerance(self) -> StressTolerance {
        match self {
            Self::No => StressTolerance::No,
            Self::Unknown => StressTolerance::Unknown,
        }
    }
}

impl FromStr for MissingEvidencePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "no" => Ok(Self::No),
            "unknown" => Ok(Self::Unknown),
            other => Err(format!("unknown missing-evidence policy '{other}' (expected 'no' or 'unknown')")),
        }
    }
}

impl fmt::Display for MissingEvidencePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::No => write!(f, "no"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// With `required == false` a missing file yields the defaults.
    pub fn load(path: &Path, required: bool) -> Result<Self> {
        if !path.exists() {
            if required {
                return Err(PipelineError::Config(format!(
                    "Config file '{}' does not exist",
                    path.display()
                )));
            }
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        Self::from_toml(&config_content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Merge command-line values over the loaded file and re-check the result.
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) -> Result<()> {
        if let Some(dir) = overrides.data_dir {
            self.input.data_dir = dir;
        }
        if let Some(path) = overrides.csv_path {
            self.output.csv_path = path;
        }
        if let Some(path) = overrides.json_path {
            self.output.json_path = path;
        }
        if let Some(policy) = overrides.missing_evidence {
            self.processing.missing_evidence = policy;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        regex::Regex::new(&self.input.file_pattern)?;
        if self.output.csv_path == self.output.json_path {
            return Err(PipelineError::Config(format!(
                "CSV and JSON outputs point at the same file '{}'",
                self.output.csv_path.display()
            )));
        }
        Ok(())
    }
}
