use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

use crop_variety_pipeline::app::build_use_case::BuildUseCase;
use crop_variety_pipeline::app::inspect_use_case::InspectUseCase;
use crop_variety_pipeline::app::ports::RecordSinkPort;
use crop_variety_pipeline::config::{Config, ConfigOverrides, MissingEvidencePolicy};
use crop_variety_pipeline::constants;
use crop_variety_pipeline::infra::{CsvOutputAdapter, JsonOutputAdapter};
use crop_variety_pipeline::logging;
use crop_variety_pipeline::pipeline::ingestion::BatchLoader;
use crop_variety_pipeline::pipeline::processing::normalize::DefaultNormalizer;

#[derive(Parser)]
#[command(name = "crop_variety_pipeline")]
#[command(about = "Compile enhanced crop variety batches into dashboard CSV and JSON")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Tolerance for varieties without search metadata: no or unknown
    #[arg(long, global = true)]
    missing_evidence: Option<MissingEvidencePolicy>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every batch file, normalize, and write both outputs
    Build {
        /// Directory holding the enhanced batch files
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Destination of the tabular output
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Destination of the structured output
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Normalize a single batch file and print the records to stdout
    Inspect {
        /// Batch file to read
        file: PathBuf,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path, true)?,
        None => Config::load(&PathBuf::from(constants::DEFAULT_CONFIG_FILE), false)?,
    };

    let mut overrides = ConfigOverrides {
        missing_evidence: cli.missing_evidence,
        ..Default::default()
    };
    if let Commands::Build { data_dir, csv, json } = &cli.command {
        overrides.data_dir = data_dir.clone();
        overrides.csv_path = csv.clone();
        overrides.json_path = json.clone();
    }

    config.apply_overrides(overrides)?;
    Ok(config)
}

fn run_build(config: &Config) -> anyhow::Result<()> {
    info!("Crop variety data build starting");
    info!("Missing-evidence policy: {}", config.processing.missing_evidence);

    let loader = BatchLoader::new(&config.input.data_dir, &config.input.file_pattern)?;
    let sinks: Vec<Box<dyn RecordSinkPort>> = vec![
        Box::new(CsvOutputAdapter::new(&config.output.csv_path)),
        Box::new(JsonOutputAdapter::new(&config.output.json_path)),
    ];
    let use_case = BuildUseCase::new(
        Box::new(loader),
        Box::new(DefaultNormalizer::new(config.processing.missing_evidence)),
        sinks,
    )
    .with_progress_interval(config.processing.progress_interval);

    let summary = use_case.run()?;
    println!("{}", summary);
    Ok(())
}

fn run_inspect(config: &Config, file: &Path) -> anyhow::Result<()> {
    let use_case = InspectUseCase::new(Box::new(DefaultNormalizer::new(
        config.processing.missing_evidence,
    )));
    let batch = use_case.run(file)?;

    println!("{}", serde_json::to_string_pretty(&batch.records)?);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return ExitCode::from(2);
        }
    };

    let _guard = logging::init_logging(&config.logging);

    let result = match &cli.command {
        Commands::Build { .. } => run_build(&config),
        Commands::Inspect { file } => run_inspect(&config, file),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("Run failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
