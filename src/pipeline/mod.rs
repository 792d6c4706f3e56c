// Data processing pipeline: ingestion, normalization and run summary

pub mod ingestion;
pub mod processing;
pub mod summary;
