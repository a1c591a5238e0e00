//! Where snapshots come from.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::error::{MonitorError, MonitorResult};
use crate::snapshot::MetricsSnapshot;

/// Delay before re-reading a status file that failed to parse.
const TORN_READ_RETRY: Duration = Duration::from_millis(25);

/// Producer of job snapshots. Fetched from the poller thread.
pub trait SnapshotSource: Send {
    fn fetch(&mut self) -> MonitorResult<MetricsSnapshot>;

    /// Short human-readable name, used in logs.
    fn describe(&self) -> String;
}

/// JSON status file rewritten in place by the training backend.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> MonitorResult<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => {
                Err(MonitorError::SourceEmpty(self.path.clone()))
            }
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(MonitorError::SourceMissing(self.path.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl SnapshotSource for FileSource {
    /// Read and parse the file. A parse failure is retried once, since the
    /// writer may have been caught mid-write.
    fn fetch(&mut self) -> MonitorResult<MetricsSnapshot> {
        let content = self.read()?;
        match MetricsSnapshot::from_json(&content) {
            Ok(snapshot) => Ok(snapshot),
            Err(first) => {
                debug!(path = %self.path.display(), error = %first, "Retrying torn status read");
                thread::sleep(TORN_READ_RETRY);
                MetricsSnapshot::from_json(&self.read()?)
            }
        }
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let mut source = FileSource::new(dir.path().join("status.json"));
        assert!(matches!(source.fetch(), Err(MonitorError::SourceMissing(_))));
    }

    #[test]
    fn test_empty_file() {
        let file = NamedTempFile::new().unwrap();
        let mut source = FileSource::new(file.path());
        assert!(matches!(source.fetch(), Err(MonitorError::SourceEmpty(_))));
    }

    #[test]
    fn test_reads_snapshot() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"job_id": "ft-3", "status": "running", "current_epoch": 2}}"#).unwrap();
        let mut source = FileSource::new(file.path());
        let snapshot = source.fetch().unwrap();
        assert_eq!(snapshot.job_id, "ft-3");
        assert_eq!(snapshot.current_epoch, 2);
        assert!(source.describe().starts_with("file "));
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{\"job_id\": ").unwrap();
        let mut source = FileSource::new(file.path());
        assert!(matches!(source.fetch(), Err(MonitorError::Serde(_))));
    }
}
