//! Single-worker download scheduler.
//!
//! Callers on any thread enqueue tracks and cancel work; one dedicated worker
//! thread drains the queue strictly by `(priority, sequence)`, calls the
//! [`FetchAdapter`] with the lock released, and reports lifecycle events to
//! the [`EventSink`]. Cancellation is cooperative: a cancel request sets the
//! running job's token and the adapter stops at its next check, or the job
//! runs to completion if it is already past its last check.

mod admission;
mod cancel;
mod guard;
mod options;
mod progress;
mod state;
mod worker;

use serde::Serialize;
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::{TuneCacheConfig, MIN_PROGRESS_THROTTLE_SECS};
use crate::events::EventSink;
use crate::fetch::FetchAdapter;
use crate::job::Job;
use crate::ledger::RequestStats;

pub use options::{EnqueueOptions, BACKGROUND_PRIORITY, FOCUS_PRIORITY, PREFETCH_PRIORITY};

use state::Shared;

/// Contract violations reported synchronously to callers. Per-job outcomes
/// are never reported here; they arrive as events.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("download scheduler has been shut down")]
    ShutDown,
    #[error("spawn fetch worker: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Timing knobs for the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerSettings {
    progress_interval: Duration,
    idle_poll: Duration,
    join_timeout: Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self::from_config(&TuneCacheConfig::default())
    }
}

impl SchedulerSettings {
    pub fn from_config(cfg: &TuneCacheConfig) -> Self {
        Self {
            progress_interval: cfg.progress_throttle(),
            idle_poll: cfg.idle_poll(),
            join_timeout: cfg.shutdown_timeout(),
        }
    }

    /// Floors the interval at 50 ms.
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval.max(Duration::from_secs_f64(MIN_PROGRESS_THROTTLE_SECS));
        self
    }

    pub fn with_idle_poll(mut self, idle_poll: Duration) -> Self {
        self.idle_poll = idle_poll.max(Duration::from_millis(1));
        self
    }

    pub fn with_join_timeout(mut self, join_timeout: Duration) -> Self {
        self.join_timeout = join_timeout;
        self
    }

    pub fn progress_interval(&self) -> Duration {
        self.progress_interval
    }

    pub fn idle_poll(&self) -> Duration {
        self.idle_poll
    }

    pub fn join_timeout(&self) -> Duration {
        self.join_timeout
    }
}

/// Point-in-time view for status displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchedulerSnapshot {
    /// Whether the worker thread is alive.
    pub running: bool,
    pub queue_size: usize,
    /// Job being fetched right now, if any.
    pub current: Option<Job>,
}

struct WorkerHandle {
    thread: JoinHandle<()>,
    exited: mpsc::Receiver<()>,
}

/// Priority download scheduler. Share it behind an `Arc`; all methods take `&self`.
pub struct DownloadScheduler {
    shared: Arc<Shared>,
    worker: Mutex<Option<WorkerHandle>>,
}

impl DownloadScheduler {
    /// Creates an idle scheduler. Tracks may be enqueued before [`start`](Self::start).
    pub fn new(
        adapter: Arc<dyn FetchAdapter>,
        sink: Arc<dyn EventSink>,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            shared: Arc::new(Shared::new(adapter, sink, settings)),
            worker: Mutex::new(None),
        }
    }

    /// Spawns the worker thread. No-op while a worker is already running.
    pub fn start(&self) -> Result<(), SchedulerError> {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        self.shared.lock().ensure_open()?;
        if let Some(handle) = worker.as_ref() {
            if !handle.thread.is_finished() {
                return Ok(());
            }
        }

        let (exit_tx, exit_rx) = mpsc::channel();
        let shared = Arc::clone(&self.shared);
        let thread = thread::Builder::new()
            .name("tunecache-fetch".to_string())
            .spawn(move || worker::run_worker(shared, exit_tx))?;
        *worker = Some(WorkerHandle {
            thread,
            exited: exit_rx,
        });
        tracing::info!("download scheduler started");
        Ok(())
    }

    /// Stops the worker and rejects further mutating calls.
    ///
    /// Waits up to the configured join timeout for the worker to exit and
    /// returns whether it did. A worker stuck in an adapter that ignores
    /// cancellation is left to finish on its own.
    pub fn shutdown(&self, cancel_in_progress: bool) -> bool {
        self.shared.signal_stop(cancel_in_progress);

        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(handle) = handle else {
            return true;
        };

        match handle.exited.recv_timeout(self.shared.settings.join_timeout()) {
            Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => {
                if handle.thread.join().is_err() {
                    tracing::warn!("fetch worker panicked");
                }
                tracing::info!("download scheduler stopped");
                true
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    timeout_ms = self.shared.settings.join_timeout().as_millis() as u64,
                    "fetch worker did not stop in time; detaching"
                );
                false
            }
        }
    }

    pub fn snapshot(&self) -> SchedulerSnapshot {
        let running = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.thread.is_finished());
        let state = self.shared.lock();
        SchedulerSnapshot {
            running,
            queue_size: state.queue.len(),
            current: state.running.as_ref().map(|r| r.job.clone()),
        }
    }

    /// Whether `source_key` is queued or being fetched.
    pub fn is_downloading(&self, source_key: &str) -> bool {
        if source_key.is_empty() {
            return false;
        }
        let state = self.shared.lock();
        state.running_key() == Some(source_key) || state.queue.contains(source_key)
    }

    pub fn request_stats(&self, request_id: &str) -> Option<RequestStats> {
        self.shared.lock().ledger.get(request_id).cloned()
    }
}

impl Drop for DownloadScheduler {
    fn drop(&mut self) {
        self.shared.signal_stop(false);
    }
}
