use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{PipelineError, Result};

/// Output file written beside its destination and renamed over it on commit.
///
/// The destination is never opened for writing, so a failed run leaves any
/// earlier output in place.
#[derive(Debug, Clone)]
pub struct StagedFile {
    destination: PathBuf,
    staging: PathBuf,
}

impl StagedFile {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        let destination = destination.into();
        let staging = staging_path(&destination);
        Self {
            destination,
            staging,
        }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn staging(&self) -> &Path {
        &self.staging
    }

    pub fn output_error(&self, source: io::Error) -> PipelineError {
        PipelineError::Output {
            path: self.destination.clone(),
            source,
        }
    }

    /// Open the staging file, creating the destination's directory if needed.
    pub fn create(&self) -> Result<BufWriter<File>> {
        if self.destination.is_dir() {
            return Err(self.output_error(io::Error::new(
                io::ErrorKind::Other,
                "destination is a directory",
            )));
        }
        ensure_parent_dir(&self.destination).map_err(|e| self.output_error(e))?;
        let file = File::create(&self.staging).map_err(|e| self.output_error(e))?;
        Ok(BufWriter::new(file))
    }

    pub fn commit(&self) -> Result<PathBuf> {
        fs::rename(&self.staging, &self.destination).map_err(|e| self.output_error(e))?;
        debug!("Committed {}", self.destination.display());
        Ok(self.destination.clone())
    }

    /// Remove the staging file; a file that was never written is fine.
    pub fn discard(&self) {
        match fs::remove_file(&self.staging) {
            Ok(()) => debug!("Discarded {}", self.staging.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove {}: {}", self.staging.display(), e),
        }
    }
}

/// Hidden sibling of `destination`, so the final rename stays on one filesystem
fn staging_path(destination: &Path) -> PathBuf {
    let name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    destination.with_file_name(format!(".{name}.partial"))
}

fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_staging_path_is_hidden_sibling() {
        let staged = StagedFile::new("out/varieties.csv");
        assert_eq!(staged.staging(), Path::new("out/.varieties.csv.partial"));
        assert_eq!(staged.destination(), Path::new("out/varieties.csv"));
    }

    #[test]
    fn test_commit_replaces_destination() {
        let temp_dir = tempdir().unwrap();
        let destination = temp_dir.path().join("nested/varieties.csv");
        let staged = StagedFile::new(&destination);

        let mut writer = staged.create().unwrap();
        writer.write_all(b"fresh").unwrap();
        writer.flush().unwrap();
        drop(writer);
        assert!(!destination.exists());

        assert_eq!(staged.commit().unwrap(), destination);
        assert_eq!(fs::read_to_string(&destination).unwrap(), "fresh");
        assert!(!staged.staging().exists());
    }

    #[test]
    fn test_discard_keeps_previous_output() {
        let temp_dir = tempdir().unwrap();
        let destination = temp_dir.path().join("varieties.json");
        fs::write(&destination, "previous").unwrap();
        let staged = StagedFile::new(&destination);

        let mut writer = staged.create().unwrap();
        writer.write_all(b"half").unwrap();
        drop(writer);
        staged.discard();
        staged.discard();

        assert!(!staged.staging().exists());
        assert_eq!(fs::read_to_string(&destination).unwrap(), "previous");
    }

    #[test]
    fn test_directory_destination_is_rejected_before_writing() {
        let temp_dir = tempdir().unwrap();
        let staged = StagedFile::new(temp_dir.path());

        let err = staged.create().unwrap_err();
        assert!(matches!(err, PipelineError::Output { .. }));
        assert!(!staged.staging().exists());
    }
}
