pub mod csv_output_adapter;
pub mod json_output_adapter;
pub mod staged_file;

pub use csv_output_adapter::CsvOutputAdapter;
pub use json_output_adapter::JsonOutputAdapter;
pub use staged_file::StagedFile;
