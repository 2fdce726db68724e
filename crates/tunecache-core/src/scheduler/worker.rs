//! The worker loop: pop, fetch with the lock released, classify, report.

use anyhow::anyhow;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::time::Instant;

use crate::control::CancelToken;
use crate::events::SchedulerEvent;
use crate::fetch::{FetchError, ProgressSignal, TransferProgress};
use crate::job::Job;

use super::guard::{ExitSignal, RunningSlotGuard};
use super::progress::ProgressThrottle;
use super::state::{RunningJob, Shared};

/// Where a job sits within its request when it starts.
#[derive(Debug, Clone, Copy)]
struct Ordinal {
    position: usize,
    total: usize,
}

pub(super) fn run_worker(shared: Arc<Shared>, exited: mpsc::Sender<()>) {
    let _exit = ExitSignal(exited);
    tracing::debug!("fetch worker running");

    while let Some((job, cancel)) = next_job(&shared) {
        run_job(&shared, job, cancel);
        if shared.queue_size() == 0 {
            shared.emit(SchedulerEvent::Idle);
        }
    }

    tracing::debug!("fetch worker exiting");
}

/// Blocks until a job is available or stop is requested. The popped job is
/// installed as running with a fresh cancel token in the same critical section.
fn next_job(shared: &Shared) -> Option<(Job, CancelToken)> {
    let mut state = shared.lock();
    loop {
        if shared.is_stopping() {
            return None;
        }
        if let Some(job) = state.queue.pop() {
            let cancel = CancelToken::new();
            state.running = Some(RunningJob {
                job: job.clone(),
                cancel: cancel.clone(),
            });
            tracing::debug!(
                source_key = %job.source_key,
                priority = job.priority,
                sequence = job.sequence,
                "popped job"
            );
            return Some((job, cancel));
        }
        state = shared.wait(state);
    }
}

fn run_job(shared: &Shared, job: Job, cancel: CancelToken) {
    let _slot = RunningSlotGuard { shared };

    let (ordinal, label) = {
        let state = shared.lock();
        match state.ledger.get(&job.request_id) {
            Some(stats) => (
                Ordinal {
                    position: stats.next_position(),
                    total: stats.total,
                },
                stats.label.clone(),
            ),
            None => (
                Ordinal {
                    position: 1,
                    total: 0,
                },
                String::new(),
            ),
        }
    };

    tracing::info!(
        request_id = %job.request_id,
        position = ordinal.position,
        total = ordinal.total,
        "fetching {}",
        job.display_name()
    );
    shared.emit(SchedulerEvent::Start {
        job: job.clone(),
        position: ordinal.position,
        total: ordinal.total,
        queue_size: shared.queue_size(),
        label,
    });

    let mut throttle = ProgressThrottle::new(shared.settings.progress_interval());
    let mut on_progress = |progress: TransferProgress| -> ProgressSignal {
        if cancel.is_cancelled() || shared.is_stopping() {
            return ProgressSignal::Cancel;
        }
        if throttle.admit(&progress, Instant::now()) {
            shared.emit(SchedulerEvent::Progress {
                job: job.clone(),
                percent: progress.percent,
                downloaded: progress.downloaded,
                total_bytes: progress.total_bytes,
                position: ordinal.position,
                total: ordinal.total,
                queue_size: shared.queue_size(),
            });
        }
        ProgressSignal::Continue
    };

    let request = job.fetch_request();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        shared.adapter.download(&request, &cancel, &mut on_progress)
    }))
    .unwrap_or_else(|_| Err(FetchError::Failed(anyhow!("fetch adapter panicked"))));

    finish(shared, job, outcome, ordinal);
}

/// Records the outcome in the ledger and emits the job's terminal event.
fn finish(shared: &Shared, job: Job, outcome: Result<PathBuf, FetchError>, ordinal: Ordinal) {
    let Ordinal { position, total } = ordinal;
    let mut state = shared.lock();
    let event = match outcome {
        Ok(path) => {
            state.ledger.record_done(&job.request_id);
            tracing::info!(request_id = %job.request_id, path = %path.display(), "fetched {}", job.display_name());
            SchedulerEvent::Complete {
                job,
                path,
                position,
                total,
                queue_size: state.queue.len(),
            }
        }
        Err(FetchError::Cancelled) => {
            state.ledger.record_canceled(&job.request_id, 1);
            tracing::info!(request_id = %job.request_id, "cancelled {}", job.display_name());
            SchedulerEvent::Canceled {
                job,
                position,
                total,
                queue_size: state.queue.len(),
            }
        }
        Err(FetchError::Failed(err)) => {
            state.ledger.record_failed(&job.request_id);
            let error = format!("{:#}", err);
            tracing::warn!(request_id = %job.request_id, "fetch failed for {}: {}", job.display_name(), error);
            SchedulerEvent::Error {
                job,
                error,
                position,
                total,
                queue_size: state.queue.len(),
            }
        }
    };
    drop(state);
    shared.emit(event);
}
