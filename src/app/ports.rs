use std::path::PathBuf;

use crate::error::Result;
use crate::pipeline::ingestion::LoadReport;
use crate::types::CanonicalRecord;

/// Supplies the raw records of a run
pub trait RecordSourcePort {
    fn load(&self) -> LoadReport;
}

/// Persists canonical records in two phases so a failed run publishes nothing.
pub trait RecordSinkPort {
    fn name(&self) -> &str;
    /// Write records to a staging location; the destination is left untouched
    fn stage(&self, records: &[CanonicalRecord]) -> Result<()>;
    /// Move the staged output over the destination
    fn commit(&self) -> Result<PathBuf>;
    /// Drop staged output after another sink failed
    fn discard(&self);
}
