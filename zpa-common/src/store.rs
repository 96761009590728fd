//! JSON snapshot of the enriched dataset
//!
//! The snapshot is the pipeline's only durable output. Once it exists it is
//! the source of truth: the server and the area-name passes read it instead
//! of re-deriving records from the raw CSV.

use crate::record::Record;
use crate::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File-backed dataset snapshot
#[derive(Debug, Clone)]
pub struct DatasetStore {
    path: PathBuf,
}

impl DatasetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the persisted records
    ///
    /// Returns `Ok(None)` when no snapshot exists yet; the caller is expected
    /// to run the full pipeline in that case.
    pub fn load(&self) -> Result<Option<Vec<Record>>> {
        if !self.exists() {
            debug!(path = %self.path.display(), "Snapshot absent");
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)?;
        let records: Vec<Record> = serde_json::from_str(&content).map_err(|e| {
            Error::Parse(format!("snapshot {} is malformed: {}", self.path.display(), e))
        })?;

        info!(
            path = %self.path.display(),
            "Loaded {} processed records",
            records.len()
        );
        Ok(Some(records))
    }

    /// Replace the snapshot with `records`
    ///
    /// Writes to a temporary file next to the snapshot and renames it into
    /// place, so readers see either the old or the new dataset.
    pub fn save(&self, records: &[Record]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut tmp, records)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        info!(
            path = %self.path.display(),
            "Processed data saved ({} records)",
            records.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_snapshot_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = DatasetStore::new(dir.path().join("processed_data.json"));
        assert!(!store.exists());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = DatasetStore::new(dir.path().join("nested").join("snapshot.json"));
        store.save(&[Record::new("10001")]).unwrap();
        assert!(store.exists());
    }

    #[test]
    fn test_malformed_snapshot_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed_data.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = DatasetStore::new(&path).load().unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
