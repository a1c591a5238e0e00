//! Point-in-time job status as published by the training backend.
//!
//! A [`MetricsSnapshot`] is the only input of the rendering pipeline. Every
//! field carries a serde default so partial documents from older producers
//! still parse, and an explicit `null` reads the same as a missing field.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::MonitorResult;
use crate::format::{clamp_percent, format_duration, percent_of};

/// Lifecycle status of a fine-tuning job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepted, waiting for a worker
    #[default]
    Queued,
    /// Worker assigned, not yet training
    Pending,
    /// Training is actively running
    Running,
    /// Training completed successfully
    Completed,
    /// Training failed with error
    Failed,
    /// Training was cancelled
    Cancelled,
    /// Training is paused
    Paused,
}

impl JobStatus {
    pub fn can_pause(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn can_resume(&self) -> bool {
        matches!(self, Self::Paused)
    }

    pub fn can_cancel(&self) -> bool {
        matches!(
            self,
            Self::Queued | Self::Pending | Self::Running | Self::Paused
        )
    }

    /// Check if the job has finished (completed, failed, or cancelled).
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Queued => "QUEUED",
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
            Self::Paused => "PAUSED",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Queued | Self::Pending => "..",
            Self::Running => ">>",
            Self::Completed => "OK",
            Self::Failed => "XX",
            Self::Cancelled => "--",
            Self::Paused => "||",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Severity of a job log line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

/// One line of job output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_default")]
    pub level: LogLevel,
    #[serde(default, deserialize_with = "null_default")]
    pub message: String,
}

/// A single sample of a time series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartDataPoint {
    pub x: f64,
    pub y: f64,
}

impl ChartDataPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// GPU memory and load reported by the worker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpuStatus {
    /// Memory held by live tensors, GB
    #[serde(deserialize_with = "null_default")]
    pub allocated_gb: f64,
    /// Memory reserved by the caching allocator, GB
    #[serde(deserialize_with = "null_default")]
    pub reserved_gb: f64,
    /// Device memory, GB
    #[serde(deserialize_with = "null_default")]
    pub total_gb: f64,
    /// Compute utilization percentage
    #[serde(deserialize_with = "null_default")]
    pub utilization_percent: f64,
    /// Temperature in Celsius
    pub temperature_c: Option<f64>,
}

impl GpuStatus {
    /// Allocated memory as a clamped percentage of total.
    pub fn memory_percent(&self) -> f64 {
        if self.total_gb <= 0.0 {
            0.0
        } else {
            clamp_percent(100.0 * self.allocated_gb / self.total_gb)
        }
    }

    pub fn utilization(&self) -> f64 {
        clamp_percent(self.utilization_percent)
    }
}

/// Best checkpoint saved so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointSummary {
    #[serde(deserialize_with = "null_default")]
    pub epoch: u32,
    #[serde(deserialize_with = "null_default")]
    pub step: u64,
    pub eval_loss: Option<f64>,
    pub train_loss: Option<f64>,
    pub saved_at: Option<DateTime<Utc>>,
}

fn default_total() -> u32 {
    1
}

fn default_total_steps() -> u64 {
    1
}

/// Read `null` as the type's default.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Read `null` as a total of one.
fn null_total<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: From<u8> + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_else(|| T::from(1)))
}

/// Everything the monitor knows about a job at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsSnapshot {
    #[serde(deserialize_with = "null_default")]
    pub job_id: String,
    #[serde(deserialize_with = "null_default")]
    pub model_name: String,
    pub dataset_name: Option<String>,
    pub dataset_id: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub status: JobStatus,

    #[serde(deserialize_with = "null_default")]
    pub current_epoch: u32,
    #[serde(default = "default_total", deserialize_with = "null_total")]
    pub total_epochs: u32,
    #[serde(deserialize_with = "null_default")]
    pub current_step: u64,
    #[serde(default = "default_total_steps", deserialize_with = "null_total")]
    pub total_steps: u64,

    pub train_loss: Option<f64>,
    pub eval_loss: Option<f64>,
    pub best_eval_loss: Option<f64>,
    pub learning_rate: Option<f64>,

    #[serde(deserialize_with = "null_default")]
    pub loss_history: Vec<ChartDataPoint>,
    #[serde(deserialize_with = "null_default")]
    pub lr_history: Vec<ChartDataPoint>,

    pub samples_per_second: Option<f64>,
    pub tokens_per_second: Option<f64>,
    /// Average step time in seconds
    pub avg_step_time: Option<f64>,

    pub gpu: Option<GpuStatus>,
    pub best_checkpoint: Option<CheckpointSummary>,
    #[serde(deserialize_with = "null_default")]
    pub recent_logs: Vec<LogEntry>,
    /// Stale-job notice, shown above the panels
    pub warning: Option<String>,

    pub elapsed_seconds: Option<f64>,
    pub eta_seconds: Option<f64>,
    /// When the producer wrote this snapshot
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for MetricsSnapshot {
    fn default() -> Self {
        Self {
            job_id: String::new(),
            model_name: String::new(),
            dataset_name: None,
            dataset_id: None,
            status: JobStatus::default(),
            current_epoch: 0,
            total_epochs: default_total(),
            current_step: 0,
            total_steps: default_total_steps(),
            train_loss: None,
            eval_loss: None,
            best_eval_loss: None,
            learning_rate: None,
            loss_history: Vec::new(),
            lr_history: Vec::new(),
            samples_per_second: None,
            tokens_per_second: None,
            avg_step_time: None,
            gpu: None,
            best_checkpoint: None,
            recent_logs: Vec::new(),
            warning: None,
            elapsed_seconds: None,
            eta_seconds: None,
            updated_at: None,
        }
    }
}

impl MetricsSnapshot {
    /// Parse a snapshot from a JSON document.
    pub fn from_json(json: &str) -> MonitorResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn total_epochs(&self) -> u32 {
        self.total_epochs.max(1)
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps.max(1)
    }

    pub fn epoch_percent(&self) -> f64 {
        percent_of(self.current_epoch as u64, self.total_epochs() as u64)
    }

    pub fn step_percent(&self) -> f64 {
        percent_of(self.current_step, self.total_steps())
    }

    /// Overall progress. Tracks epoch completion only; step progress within
    /// the epoch does not contribute.
    pub fn overall_percent(&self) -> f64 {
        self.epoch_percent()
    }

    /// Train loss, or eval loss when no train loss was reported.
    pub fn current_loss(&self) -> Option<f64> {
        self.train_loss.or(self.eval_loss)
    }

    /// Keep only the most recent `history_limit` chart points and
    /// `log_limit` log entries.
    pub fn truncate(&mut self, history_limit: usize, log_limit: usize) {
        keep_last(&mut self.loss_history, history_limit);
        keep_last(&mut self.lr_history, history_limit);
        keep_last(&mut self.recent_logs, log_limit);
    }

    /// Seconds since the producer last wrote this snapshot.
    pub fn age_seconds(&self, now: DateTime<Utc>) -> Option<i64> {
        self.updated_at.map(|at| (now - at).num_seconds())
    }

    /// Attach a stale-job warning when a running job has been silent for at
    /// least `stale_after_secs`. A warning sent by the producer is kept.
    ///
    /// Returns true if a warning was added.
    pub fn flag_if_stale(&mut self, now: DateTime<Utc>, stale_after_secs: u64) -> bool {
        if self.warning.is_some() || self.status != JobStatus::Running {
            return false;
        }
        match self.age_seconds(now) {
            Some(age) if age >= 0 && age as u64 >= stale_after_secs => {
                self.warning = Some(format!(
                    "No update from the job for {}; it may be stalled",
                    format_duration(age as f64)
                ));
                true
            }
            _ => false,
        }
    }
}

fn keep_last<T>(items: &mut Vec<T>, limit: usize) {
    if items.len() > limit {
        items.drain(..items.len() - limit);
    }
}
