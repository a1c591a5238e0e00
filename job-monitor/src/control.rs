//! Job-control requests.
//!
//! The monitor never changes job state itself. Pause, resume and cancel are
//! handed to a [`ControlSink`], and the effect shows up in a later snapshot.

use std::cell::RefCell;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{MonitorError, MonitorResult};
use crate::monitor::MonitorCallbacks;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlAction {
    Pause,
    Resume,
    Cancel,
}

/// One request, serialized as a single JSON line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlRequest {
    pub job_id: String,
    pub action: ControlAction,
    pub requested_at: DateTime<Utc>,
}

impl ControlRequest {
    pub fn new(job_id: impl Into<String>, action: ControlAction) -> Self {
        Self {
            job_id: job_id.into(),
            action,
            requested_at: Utc::now(),
        }
    }
}

/// Receiver of job-control requests.
pub trait ControlSink {
    fn send(&mut self, request: &ControlRequest) -> MonitorResult<()>;
}

/// Appends requests as JSON lines to a file the backend watches.
#[derive(Debug, Clone)]
pub struct FileControlSink {
    path: PathBuf,
}

impl FileControlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ControlSink for FileControlSink {
    fn send(&mut self, request: &ControlRequest) -> MonitorResult<()> {
        let mut line = serde_json::to_string(request)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                MonitorError::control(format!("cannot open {}: {}", self.path.display(), e))
            })?;
        file.write_all(line.as_bytes())?;
        file.flush()?;

        info!(
            job_id = %request.job_id,
            action = ?request.action,
            path = %self.path.display(),
            "Control request written"
        );
        Ok(())
    }
}

/// Callbacks forwarding every job-control action to `sink`.
pub fn control_callbacks<S>(sink: Rc<RefCell<S>>) -> MonitorCallbacks<'static>
where
    S: ControlSink + 'static,
{
    let forward = |action: ControlAction| {
        let sink = Rc::clone(&sink);
        move |job_id: &str| sink.borrow_mut().send(&ControlRequest::new(job_id, action))
    };

    MonitorCallbacks::new()
        .on_pause(forward(ControlAction::Pause))
        .on_resume(forward(ControlAction::Resume))
        .on_cancel(forward(ControlAction::Cancel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::MonitorAction;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_file_sink_appends_json_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("control.jsonl");
        let mut sink = FileControlSink::new(&path);
        sink.send(&ControlRequest::new("ft-1", ControlAction::Pause))
            .unwrap();
        sink.send(&ControlRequest::new("ft-1", ControlAction::Cancel))
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let requests: Vec<ControlRequest> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].action, ControlAction::Pause);
        assert_eq!(requests[1].action, ControlAction::Cancel);
        assert!(content.contains(r#""action":"cancel""#));
    }

    #[test]
    fn test_unwritable_path_is_control_error() {
        let dir = tempdir().unwrap();
        let mut sink = FileControlSink::new(dir.path().join("missing").join("control.jsonl"));
        let err = sink
            .send(&ControlRequest::new("ft-1", ControlAction::Resume))
            .unwrap_err();
        assert!(matches!(err, MonitorError::Control(_)));
    }

    #[derive(Default)]
    struct Recording(Vec<ControlRequest>);

    impl ControlSink for Recording {
        fn send(&mut self, request: &ControlRequest) -> MonitorResult<()> {
            self.0.push(request.clone());
            Ok(())
        }
    }

    #[test]
    fn test_callbacks_route_to_sink() {
        let sink = Rc::new(RefCell::new(Recording::default()));
        let mut callbacks = control_callbacks(Rc::clone(&sink));
        assert!(callbacks.available().pause);
        callbacks.invoke(MonitorAction::Resume, "ft-7").unwrap();
        callbacks.invoke(MonitorAction::Quit, "ft-7").unwrap();

        let recorded = sink.borrow();
        assert_eq!(recorded.0.len(), 1);
        assert_eq!(recorded.0[0].job_id, "ft-7");
        assert_eq!(recorded.0[0].action, ControlAction::Resume);
    }
}
