//! Background snapshot polling.
//!
//! One thread per session fetches from a [`SnapshotSource`] every
//! `interval` and reports over a channel. The UI thread drains the channel
//! between frames. Dropping the [`Poller`] ends the session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::MonitorConfig;
use crate::error::{MonitorError, MonitorResult};
use crate::snapshot::MetricsSnapshot;
use crate::source::SnapshotSource;

/// Granularity at which a sleeping poller notices a stop request.
const STOP_CHECK: Duration = Duration::from_millis(50);

/// Message from the poller thread.
#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    /// A fetch is in flight
    Started,
    Snapshot(Box<MetricsSnapshot>),
    Failed(String),
}

/// How a poll session fetches and post-processes snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub history_limit: usize,
    pub log_buffer_limit: usize,
    pub stale_after_secs: Option<u64>,
}

impl PollSettings {
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.refresh_ms),
            history_limit: config.history_limit,
            log_buffer_limit: config.log_buffer_limit,
            stale_after_secs: config.stale_after_secs,
        }
    }

    /// Bound the series and attach a stale warning if due.
    pub fn prepare(&self, snapshot: &mut MetricsSnapshot) {
        snapshot.truncate(self.history_limit, self.log_buffer_limit);
        if let Some(stale_after) = self.stale_after_secs {
            snapshot.flag_if_stale(Utc::now(), stale_after);
        }
    }
}

/// Handle to a running poll session.
pub struct Poller {
    events: Receiver<PollEvent>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    pub fn spawn(source: Box<dyn SnapshotSource>, settings: PollSettings) -> MonitorResult<Self> {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);

        info!(
            source = %source.describe(),
            interval_ms = settings.interval.as_millis() as u64,
            "Starting poller"
        );
        let handle = thread::Builder::new()
            .name("snapshot-poller".to_string())
            .spawn(move || poll_loop(source, settings, tx, thread_stop))?;

        Ok(Self {
            events: rx,
            stop,
            handle: Some(handle),
        })
    }

    /// Drain pending events without blocking.
    ///
    /// Fails with [`MonitorError::PollerDisconnected`] once the thread is
    /// gone and every event it sent has been drained.
    pub fn try_events(&self) -> MonitorResult<Vec<PollEvent>> {
        let mut events = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) => return Ok(events),
                Err(TryRecvError::Disconnected) if events.is_empty() => {
                    return Err(MonitorError::PollerDisconnected)
                }
                Err(TryRecvError::Disconnected) => return Ok(events),
            }
        }
    }

    /// Block until the next event or `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<PollEvent> {
        self.events.recv_timeout(timeout).ok()
    }

    /// Ask the thread to finish and wait for it.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Poller thread panicked");
            }
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

fn poll_loop(
    mut source: Box<dyn SnapshotSource>,
    settings: PollSettings,
    tx: Sender<PollEvent>,
    stop: Arc<AtomicBool>,
) {
    while !stop.load(Ordering::Relaxed) {
        let started = Instant::now();
        if tx.send(PollEvent::Started).is_err() {
            break;
        }

        let event = match source.fetch() {
            Ok(mut snapshot) => {
                settings.prepare(&mut snapshot);
                PollEvent::Snapshot(Box::new(snapshot))
            }
            Err(e) => {
                debug!(error = %e, "Snapshot fetch failed");
                PollEvent::Failed(e.to_string())
            }
        };
        if tx.send(event).is_err() {
            break;
        }

        let deadline = started + settings.interval;
        while !stop.load(Ordering::Relaxed) {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep((deadline - now).min(STOP_CHECK));
        }
    }
    debug!("Poller stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ChartDataPoint;

    struct Scripted {
        results: Vec<MonitorResult<MetricsSnapshot>>,
    }

    impl SnapshotSource for Scripted {
        fn fetch(&mut self) -> MonitorResult<MetricsSnapshot> {
            if self.results.is_empty() {
                Ok(MetricsSnapshot::default())
            } else {
                self.results.remove(0)
            }
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }

    fn settings() -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(10),
            history_limit: 2,
            log_buffer_limit: 10,
            stale_after_secs: None,
        }
    }

    fn next_outcome(poller: &Poller) -> PollEvent {
        loop {
            match poller.recv_timeout(Duration::from_secs(5)) {
                Some(PollEvent::Started) => continue,
                Some(event) => return event,
                None => panic!("poller produced nothing"),
            }
        }
    }

    #[test]
    fn test_snapshots_are_truncated() {
        let snapshot = MetricsSnapshot {
            job_id: "ft-1".into(),
            loss_history: (0..5).map(|i| ChartDataPoint::new(i as f64, 1.0)).collect(),
            ..Default::default()
        };
        let source = Scripted {
            results: vec![Ok(snapshot)],
        };
        let poller = Poller::spawn(Box::new(source), settings()).unwrap();
        match next_outcome(&poller) {
            PollEvent::Snapshot(s) => {
                assert_eq!(s.job_id, "ft-1");
                assert_eq!(s.loss_history.len(), 2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_failures_become_events() {
        let source = Scripted {
            results: vec![Err(MonitorError::invalid_config("boom"))],
        };
        let poller = Poller::spawn(Box::new(source), settings()).unwrap();
        assert_eq!(
            next_outcome(&poller),
            PollEvent::Failed("Invalid configuration: boom".to_string())
        );
        assert!(matches!(next_outcome(&poller), PollEvent::Snapshot(_)));
    }

    #[test]
    fn test_stop_joins_thread() {
        let source = Scripted { results: vec![] };
        let mut poller = Poller::spawn(
            Box::new(source),
            PollSettings {
                interval: Duration::from_secs(60),
                ..settings()
            },
        )
        .unwrap();
        let started = Instant::now();
        poller.stop();
        assert!(started.elapsed() < Duration::from_secs(5));
        while poller.try_events().is_ok_and(|events| !events.is_empty()) {}
        assert!(matches!(poller.try_events(), Err(MonitorError::PollerDisconnected)));
    }
}
