//! Enqueue: cache check, dedupe against queue and running job, replace mode.

use crate::events::SchedulerEvent;
use crate::job::{Job, TrackSpec};

use super::{DownloadScheduler, EnqueueOptions, SchedulerError};

impl DownloadScheduler {
    /// Admits `tracks` under `options` and returns how many were queued.
    ///
    /// Tracks are skipped when the adapter reports them cached, when their
    /// source key is already queued (including earlier in this batch), or
    /// when they are the job currently running. With `options.replace` the
    /// queue is cleared first and each cleared job counts as canceled on its
    /// own request; `options.cancel_running` then also cancels the running job.
    pub fn enqueue<I>(&self, tracks: I, options: &EnqueueOptions) -> Result<usize, SchedulerError>
    where
        I: IntoIterator<Item = TrackSpec>,
    {
        let candidates: Vec<TrackSpec> = tracks.into_iter().filter(|t| !t.is_blank()).collect();
        if candidates.is_empty() {
            self.shared.lock().ensure_open()?;
            return Ok(0);
        }

        // The adapter may touch the disk; keep it outside the lock.
        let uncached: Vec<TrackSpec> = candidates
            .into_iter()
            .filter(|spec| {
                let cached = self.shared.adapter.is_cached(&spec.fetch_request());
                if cached {
                    tracing::debug!(source_key = %spec.source_key, "skip: already cached");
                }
                !cached
            })
            .collect();

        let turn = self.shared.event_turn();
        let mut state = self.shared.lock();
        state.ensure_open()?;

        if options.replace {
            let cleared = state.clear_queue();
            if cleared > 0 {
                tracing::info!(
                    request_id = %options.request_id,
                    cleared,
                    "replace: cleared pending jobs"
                );
            }
            if options.cancel_running && state.cancel_running_if(|_| true) {
                tracing::info!(request_id = %options.request_id, "replace: cancelling running job");
            }
        }

        let mut added = 0usize;
        for spec in uncached {
            if state.queue.contains(&spec.source_key) {
                tracing::debug!(source_key = %spec.source_key, "skip: already queued");
                continue;
            }
            if state.running_key() == Some(spec.source_key.as_str()) {
                tracing::debug!(source_key = %spec.source_key, "skip: currently downloading");
                continue;
            }
            let sequence = state.queue.next_sequence();
            let job = Job::from_spec(
                spec,
                &options.request_id,
                options.priority,
                &options.default_playlist,
                sequence,
            );
            state.queue.push(job);
            added += 1;
        }

        if added > 0 {
            state
                .ledger
                .record_admitted(&options.request_id, options.priority, &options.label, added);
            let queue_size = state.queue.len();
            tracing::info!(
                request_id = %options.request_id,
                priority = options.priority,
                added,
                queue_size,
                "queued tracks"
            );
            drop(state);
            self.shared.notify();
            // The worker may pop the job now, but its start event waits for our turn.
            self.shared.deliver(SchedulerEvent::Queue {
                request_id: options.request_id.clone(),
                added,
                queue_size,
            });
        }
        drop(turn);

        Ok(added)
    }
}
