use anyhow::Result;
use crop_variety_pipeline::app::build_use_case::BuildUseCase;
use crop_variety_pipeline::app::ports::{RecordSinkPort, RecordSourcePort};
use crop_variety_pipeline::config::MissingEvidencePolicy;
use crop_variety_pipeline::constants::{CSV_COLUMNS, DEFAULT_FILE_PATTERN};
use crop_variety_pipeline::infra::{CsvOutputAdapter, JsonOutputAdapter};
use crop_variety_pipeline::pipeline::ingestion::BatchLoader;
use crop_variety_pipeline::pipeline::processing::normalize::DefaultNormalizer;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const BATCH_ONE: &str = r#"[
  {
    "variety_id": "rice_001",
    "original_data": {
      "variety_name": "Swarna Sub1",
      "crop_type": "Rice",
      "extracted_year": 2009,
      "state_zone": "Odisha, West Bengal, Assam",
      "season": "Kharif",
      "maturity_days": 145,
      "institution": "NRRI",
      "data_source": "icar"
    },
    "search_metadata": {
      "query_results": [
        {"query": "Swarna Sub1 flood tolerance", "results_count": 25},
        {"query": "Swarna Sub1 pest resistance", "results_count": NaN}
      ]
    },
    "seednet_fields": {
      "seednet_raw_variety_id": "SN-9",
      "seednet_raw_source_url": "https://example.org/SN-9"
    }
  },
  "broken record"
]"#;

const BATCH_TWO: &str = r#"[
  {
    "original_data": {"crop_variety": "HD 2967", "crop": "Wheat", "year": NaN, "state_zone": NaN}
  }
]"#;

fn write_batches(dir: &Path) -> Result<()> {
    fs::write(dir.join("enhanced_batch_0001.json"), BATCH_ONE)?;
    fs::write(dir.join("enhanced_batch_0002.json"), BATCH_TWO)?;
    fs::write(dir.join("enhanced_batch_0003.json"), "{ not json")?;
    fs::write(dir.join("notes.json"), "[{\"variety_name\": \"ignored\"}]")?;
    Ok(())
}

#[test]
fn test_loader_discovers_sorted_matching_files() -> Result<()> {
    let temp_dir = tempdir()?;
    write_batches(temp_dir.path())?;

    let loader = BatchLoader::new(temp_dir.path(), DEFAULT_FILE_PATTERN)?;
    let files = loader.discover()?;
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(
        names,
        vec!["enhanced_batch_0001.json", "enhanced_batch_0002.json", "enhanced_batch_0003.json"]
    );

    let report = loader.load();
    assert_eq!(report.files_found, 3);
    assert_eq!(report.files_loaded, 2);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].contains("enhanced_batch_0003.json"));
    assert_eq!(report.records.len(), 3);
    Ok(())
}

#[test]
fn test_missing_data_dir_is_a_load_error() -> Result<()> {
    let temp_dir = tempdir()?;
    let loader = BatchLoader::new(temp_dir.path().join("absent"), DEFAULT_FILE_PATTERN)?;

    let report = loader.load();
    assert_eq!(report.files_found, 0);
    assert!(report.records.is_empty());
    assert_eq!(report.failures.len(), 1);
    Ok(())
}

#[test]
fn test_full_build_writes_csv_and_json() -> Result<()> {
    let temp_dir = tempdir()?;
    let data_dir = temp_dir.path().join("data");
    fs::create_dir_all(&data_dir)?;
    write_batches(&data_dir)?;

    let csv_path = temp_dir.path().join("out/varieties.csv");
    let json_path = temp_dir.path().join("out/varieties.json");
    let sinks: Vec<Box<dyn RecordSinkPort>> = vec![
        Box::new(CsvOutputAdapter::new(&csv_path)),
        Box::new(JsonOutputAdapter::new(&json_path)),
    ];
    let use_case = BuildUseCase::new(
        Box::new(BatchLoader::new(&data_dir, DEFAULT_FILE_PATTERN)?),
        Box::new(DefaultNormalizer::new(MissingEvidencePolicy::No)),
        sinks,
    );

    let summary = use_case.run()?;
    assert_eq!(summary.files_found, 3);
    assert_eq!(summary.load_errors.len(), 1);
    assert_eq!(summary.records_loaded, 3);
    assert_eq!(summary.records_processed, 2);
    assert_eq!(summary.records_skipped(), 1);
    assert_eq!(summary.stats.stress_tolerant, 1);
    assert_eq!(summary.stats.with_registry, 1);
    assert_eq!(summary.stats.unique_crops, 2);
    assert_eq!(summary.outputs, vec![csv_path.clone(), json_path.clone()]);

    // Tabular output
    let csv = fs::read_to_string(&csv_path)?;
    let lines: Vec<&str> = csv.split("\r\n").filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], CSV_COLUMNS.join(","));
    assert_eq!(
        lines[1],
        "rice_001,Rice,Swarna Sub1,2009,Yes,Flood,\"OR, WB, AS\",Kharif,145,Low,Flood,YES,https://example.org/SN-9,SN-9,25,NRRI,icar"
    );
    assert_eq!(
        lines[2],
        "Wheat_HD 2967_,Wheat,HD 2967,,No,Standard variety,Unknown,Unknown,Unknown,Low,,NO,,,0,Not specified,enhanced_batch"
    );

    // Structured output
    let json: Value = serde_json::from_str(&fs::read_to_string(&json_path)?)?;
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["seednet_fields"]["variety_id"], "SN-9");
    assert_eq!(records[0]["stress_types"], serde_json::json!(["Flood"]));
    assert_eq!(records[0]["research_data"]["stress_tolerance_evidence"]["Flood"], 1);
    assert_eq!(
        records[0]["search_metadata"]["query_results"][1]["results_count"],
        Value::Null
    );
    assert_eq!(records[1]["stress_tolerance"], "No");
    assert_eq!(records[1]["primary_state"], "Unknown");
    Ok(())
}

#[test]
fn test_unwritable_output_is_fatal() -> Result<()> {
    let temp_dir = tempdir()?;
    fs::write(temp_dir.path().join("enhanced_batch_0001.json"), BATCH_TWO)?;

    // A directory cannot be opened as a file
    let sinks: Vec<Box<dyn RecordSinkPort>> = vec![Box::new(CsvOutputAdapter::new(temp_dir.path()))];
    let use_case = BuildUseCase::with_default_normalizer(
        Box::new(BatchLoader::new(temp_dir.path(), DEFAULT_FILE_PATTERN)?),
        sinks,
    );

    let err = use_case.run().unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to write"));
    Ok(())
}

#[test]
fn test_failed_output_leaves_no_partial_files() -> Result<()> {
    let temp_dir = tempdir()?;
    let data_dir = temp_dir.path().join("data");
    fs::create_dir_all(&data_dir)?;
    write_batches(&data_dir)?;

    let out_dir = temp_dir.path().join("out");
    fs::create_dir_all(&out_dir)?;
    let csv_path = out_dir.join("varieties.csv");
    fs::write(&csv_path, "previous build")?;
    // The structured output cannot be written over a directory
    let json_path = out_dir.join("varieties.json");
    fs::create_dir_all(&json_path)?;

    let sinks: Vec<Box<dyn RecordSinkPort>> = vec![
        Box::new(CsvOutputAdapter::new(&csv_path)),
        Box::new(JsonOutputAdapter::new(&json_path)),
    ];
    let use_case = BuildUseCase::with_default_normalizer(
        Box::new(BatchLoader::new(&data_dir, DEFAULT_FILE_PATTERN)?),
        sinks,
    );

    let err = use_case.run().unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.starts_with("json output failed"));
    assert_eq!(message.matches("destination is a directory").count(), 1);

    assert_eq!(fs::read_to_string(&csv_path)?, "previous build");
    let mut entries: Vec<String> = fs::read_dir(&out_dir)?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().to_string()))
        .collect::<std::io::Result<_>>()?;
    entries.sort();
    assert_eq!(entries, vec!["varieties.csv", "varieties.json"]);
    Ok(())
}
