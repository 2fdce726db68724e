//! Cancellation of queued work, and best-effort cancellation of the running job.

use crate::events::SchedulerEvent;

use super::{DownloadScheduler, SchedulerError};

impl DownloadScheduler {
    /// Empties the queue; with `cancel_running`, also asks the running job to stop.
    pub fn cancel_all(&self, cancel_running: bool) -> Result<(), SchedulerError> {
        let _turn = self.shared.event_turn();
        let mut state = self.shared.lock();
        state.ensure_open()?;
        let removed = state.clear_queue();
        let signalled = cancel_running && state.cancel_running_if(|_| true);
        tracing::info!(removed, signalled, "cancel all");
        drop(state);
        self.shared.notify();
        self.shared.deliver(SchedulerEvent::CancelAll);
        Ok(())
    }

    /// Removes queued jobs of `request_id`; with `cancel_running`, also stops the
    /// running job if it belongs to that request. Returns the number removed
    /// from the queue.
    pub fn cancel_request(
        &self,
        request_id: &str,
        cancel_running: bool,
    ) -> Result<usize, SchedulerError> {
        let _turn = self.shared.event_turn();
        let mut state = self.shared.lock();
        state.ensure_open()?;
        let removed = state
            .queue
            .remove_where(|job| job.request_id == request_id)
            .len();
        if removed > 0 {
            state.ledger.record_canceled(request_id, removed);
        }
        let signalled =
            cancel_running && state.cancel_running_if(|job| job.request_id == request_id);
        tracing::info!(request_id, removed, signalled, "cancel request");
        drop(state);
        self.shared.notify();
        self.shared.deliver(SchedulerEvent::CancelRequest {
            request_id: request_id.to_string(),
            removed,
        });
        Ok(removed)
    }

    /// Removes queued jobs whose playlist label is `playlist`, e.g. after the
    /// playlist was deleted. An empty label matches nothing.
    pub fn cancel_playlist(
        &self,
        playlist: &str,
        cancel_running: bool,
    ) -> Result<usize, SchedulerError> {
        let _turn = self.shared.event_turn();
        let mut state = self.shared.lock();
        state.ensure_open()?;
        if playlist.is_empty() {
            return Ok(0);
        }
        let removed = state.queue.remove_where(|job| job.playlist == playlist);
        for job in &removed {
            state.ledger.record_canceled(&job.request_id, 1);
        }
        let signalled = cancel_running && state.cancel_running_if(|job| job.playlist == playlist);
        tracing::info!(playlist, removed = removed.len(), signalled, "cancel playlist");
        drop(state);
        self.shared.notify();
        self.shared.deliver(SchedulerEvent::CancelPlaylist {
            playlist: playlist.to_string(),
            removed: removed.len(),
        });
        Ok(removed.len())
    }
}
