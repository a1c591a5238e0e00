//! Synthetic fine-tuning job for trying the monitor without a backend.
//!
//! Each fetch advances the job by a fixed number of steps. Curves are
//! deterministic functions of the step, so runs are reproducible.

use chrono::{DateTime, Duration as ChronoDuration, Utc};

use crate::error::MonitorResult;
use crate::snapshot::{
    ChartDataPoint, CheckpointSummary, GpuStatus, JobStatus, LogEntry, LogLevel, MetricsSnapshot,
};
use crate::source::SnapshotSource;

const TOTAL_EPOCHS: u32 = 3;
const STEPS_PER_EPOCH: u64 = 200;
const PEAK_LR: f64 = 2e-4;
const WARMUP_STEPS: u64 = 30;
const SECS_PER_STEP: f64 = 0.42;
const BATCH_SIZE: f64 = 8.0;
const SEQ_LEN: f64 = 1024.0;
const LOG_EVERY: u64 = 10;

/// Demo job advancing `steps_per_fetch` steps per fetch.
#[derive(Debug, Clone)]
pub struct DemoSource {
    job_id: String,
    started_at: DateTime<Utc>,
    step: u64,
    steps_per_fetch: u64,
}

impl Default for DemoSource {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl DemoSource {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            job_id: "ft-demo-0001".to_string(),
            started_at,
            step: 0,
            steps_per_fetch: 3,
        }
    }

    pub fn steps_per_fetch(mut self, steps: u64) -> Self {
        self.steps_per_fetch = steps.max(1);
        self
    }

    fn total_steps() -> u64 {
        STEPS_PER_EPOCH * TOTAL_EPOCHS as u64
    }

    fn at(&self, step: u64) -> DateTime<Utc> {
        let millis = (step as f64 * SECS_PER_STEP * 1000.0) as i64;
        self.started_at + ChronoDuration::milliseconds(millis)
    }

    /// Snapshot of the job as of `step`.
    pub fn snapshot_at(&self, step: u64) -> MetricsSnapshot {
        let total_steps = Self::total_steps();
        let step = step.min(total_steps);
        let finished = step == total_steps;
        let epoch = (step / STEPS_PER_EPOCH) as u32;

        let loss_history: Vec<ChartDataPoint> = (0..=step)
            .map(|s| ChartDataPoint::new(s as f64, train_loss(s)))
            .collect();
        let lr_history: Vec<ChartDataPoint> = (0..=step)
            .map(|s| ChartDataPoint::new(s as f64, learning_rate(s)))
            .collect();

        let best_checkpoint = (1..=epoch)
            .map(|e| {
                let s = e as u64 * STEPS_PER_EPOCH;
                CheckpointSummary {
                    epoch: e,
                    step: s,
                    eval_loss: Some(eval_loss(s)),
                    train_loss: Some(train_loss(s)),
                    saved_at: Some(self.at(s)),
                }
            })
            .min_by(|a, b| {
                let a = a.eval_loss.unwrap_or(f64::MAX);
                let b = b.eval_loss.unwrap_or(f64::MAX);
                a.total_cmp(&b)
            });

        let phase = step as f64 / 9.0;
        let (utilization, temperature) = if finished {
            (0.0, 41.0)
        } else {
            (88.0 + 8.0 * (phase * 1.3).sin(), 71.0 + 4.0 * (phase * 0.5).sin())
        };
        let elapsed = step as f64 * SECS_PER_STEP;
        let samples_per_second = BATCH_SIZE / SECS_PER_STEP * (1.0 + 0.03 * phase.sin());

        MetricsSnapshot {
            job_id: self.job_id.clone(),
            model_name: "llama-3.1-8b-instruct".to_string(),
            dataset_name: Some("support-tickets-v2".to_string()),
            dataset_id: Some("ds-4417".to_string()),
            status: if finished {
                JobStatus::Completed
            } else {
                JobStatus::Running
            },
            current_epoch: epoch,
            total_epochs: TOTAL_EPOCHS,
            current_step: step,
            total_steps,
            train_loss: Some(train_loss(step)),
            eval_loss: (epoch > 0).then(|| eval_loss(epoch as u64 * STEPS_PER_EPOCH)),
            best_eval_loss: best_checkpoint.as_ref().and_then(|c| c.eval_loss),
            learning_rate: Some(learning_rate(step)),
            loss_history,
            lr_history,
            samples_per_second: Some(samples_per_second),
            tokens_per_second: Some(samples_per_second * SEQ_LEN),
            avg_step_time: Some(SECS_PER_STEP),
            gpu: Some(GpuStatus {
                allocated_gb: 17.5 + 1.5 * phase.sin().abs(),
                reserved_gb: 20.0,
                total_gb: 24.0,
                utilization_percent: utilization,
                temperature_c: Some(temperature),
            }),
            best_checkpoint,
            recent_logs: self.logs_until(step),
            warning: None,
            elapsed_seconds: Some(elapsed),
            eta_seconds: Some((total_steps - step) as f64 * SECS_PER_STEP),
            updated_at: Some(self.at(step)),
        }
    }

    fn logs_until(&self, step: u64) -> Vec<LogEntry> {
        let mut logs = vec![LogEntry {
            timestamp: self.started_at,
            level: LogLevel::Info,
            message: "Loaded 12,480 training examples".to_string(),
        }];
        for s in (LOG_EVERY..=step).step_by(LOG_EVERY as usize) {
            logs.push(LogEntry {
                timestamp: self.at(s),
                level: LogLevel::Info,
                message: format!(
                    "step {} loss={:.4} lr={:.2e}",
                    s,
                    train_loss(s),
                    learning_rate(s)
                ),
            });
            if s % STEPS_PER_EPOCH == 0 {
                logs.push(LogEntry {
                    timestamp: self.at(s),
                    level: LogLevel::Info,
                    message: format!(
                        "epoch {} done, eval_loss={:.4}, checkpoint saved",
                        s / STEPS_PER_EPOCH,
                        eval_loss(s)
                    ),
                });
            } else if s % 170 == 0 {
                logs.push(LogEntry {
                    timestamp: self.at(s),
                    level: LogLevel::Warning,
                    message: "gradient norm 8.3 exceeds clip threshold".to_string(),
                });
            }
        }
        logs
    }
}

fn train_loss(step: u64) -> f64 {
    let s = step as f64;
    2.4 * (-s / 180.0).exp() + 0.55 + 0.04 * (s / 5.0).sin()
}

fn eval_loss(step: u64) -> f64 {
    let s = step as f64;
    2.4 * (-s / 200.0).exp() + 0.62
}

/// Linear warmup, then cosine decay to zero.
fn learning_rate(step: u64) -> f64 {
    let total = DemoSource::total_steps();
    if step < WARMUP_STEPS {
        return PEAK_LR * step as f64 / WARMUP_STEPS as f64;
    }
    let progress = (step - WARMUP_STEPS) as f64 / (total - WARMUP_STEPS) as f64;
    PEAK_LR * 0.5 * (1.0 + (std::f64::consts::PI * progress).cos())
}

impl SnapshotSource for DemoSource {
    fn fetch(&mut self) -> MonitorResult<MetricsSnapshot> {
        let snapshot = self.snapshot_at(self.step);
        self.step = (self.step + self.steps_per_fetch).min(Self::total_steps());
        Ok(snapshot)
    }

    fn describe(&self) -> String {
        format!("demo job {}", self.job_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn demo() -> DemoSource {
        DemoSource::new(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap())
    }

    #[test]
    fn test_advances_each_fetch() {
        let mut source = demo().steps_per_fetch(50);
        assert_eq!(source.fetch().unwrap().current_step, 0);
        assert_eq!(source.fetch().unwrap().current_step, 50);
        let third = source.fetch().unwrap();
        assert_eq!(third.current_step, 100);
        assert_eq!(third.loss_history.len(), 101);
        assert_eq!(third.status, JobStatus::Running);
    }

    #[test]
    fn test_completes_and_stays_done() {
        let source = demo();
        let done = source.snapshot_at(10_000);
        assert_eq!(done.status, JobStatus::Completed);
        assert_eq!(done.current_step, done.total_steps);
        assert_eq!(done.current_epoch, done.total_epochs);
        assert_eq!(done.epoch_percent(), 100.0);
    }

    #[test]
    fn test_checkpoint_after_first_epoch() {
        let source = demo();
        assert!(source.snapshot_at(150).best_checkpoint.is_none());
        let snapshot = source.snapshot_at(250);
        let checkpoint = snapshot.best_checkpoint.unwrap();
        assert_eq!(checkpoint.epoch, 1);
        assert_eq!(checkpoint.step, 200);
        assert_eq!(snapshot.best_eval_loss, checkpoint.eval_loss);
    }

    #[test]
    fn test_learning_rate_schedule() {
        assert_eq!(learning_rate(0), 0.0);
        assert!((learning_rate(WARMUP_STEPS) - PEAK_LR).abs() < 1e-12);
        assert!(learning_rate(DemoSource::total_steps()) < 1e-12);
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(demo().snapshot_at(77), demo().snapshot_at(77));
    }
}
