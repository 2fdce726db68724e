//! State shared between callers and the worker, guarded by one mutex.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use crate::control::CancelToken;
use crate::events::{EventSink, SchedulerEvent};
use crate::fetch::FetchAdapter;
use crate::job::Job;
use crate::ledger::RequestLedger;
use crate::queue::PendingQueue;

use super::{SchedulerError, SchedulerSettings};

/// The job the worker is currently fetching and its cancellation token.
/// A new token is created for every job.
pub(super) struct RunningJob {
    pub(super) job: Job,
    pub(super) cancel: CancelToken,
}

#[derive(Default)]
pub(super) struct State {
    pub(super) queue: PendingQueue,
    pub(super) ledger: RequestLedger,
    pub(super) running: Option<RunningJob>,
    /// Set by shutdown; mutating calls are rejected afterwards.
    pub(super) closed: bool,
}

impl State {
    pub(super) fn ensure_open(&self) -> Result<(), SchedulerError> {
        if self.closed {
            return Err(SchedulerError::ShutDown);
        }
        Ok(())
    }

    pub(super) fn running_key(&self) -> Option<&str> {
        self.running.as_ref().map(|r| r.job.source_key.as_str())
    }

    /// Cancels the running job's token if `pred` accepts it. Returns whether it did.
    pub(super) fn cancel_running_if<F>(&self, pred: F) -> bool
    where
        F: FnOnce(&Job) -> bool,
    {
        match &self.running {
            Some(running) if pred(&running.job) => {
                running.cancel.cancel();
                true
            }
            _ => false,
        }
    }

    /// Removes every queued job and counts each as canceled on its request.
    pub(super) fn clear_queue(&mut self) -> usize {
        let cleared = self.queue.drain();
        for job in &cleared {
            self.ledger.record_canceled(&job.request_id, 1);
        }
        cleared.len()
    }
}

pub(super) struct Shared {
    state: Mutex<State>,
    /// Serializes sink calls. Lock order is `event_turn` before `state`.
    event_turn: Mutex<()>,
    wake: Condvar,
    stopping: AtomicBool,
    pub(super) adapter: Arc<dyn FetchAdapter>,
    sink: Arc<dyn EventSink>,
    pub(super) settings: SchedulerSettings,
}

impl Shared {
    pub(super) fn new(
        adapter: Arc<dyn FetchAdapter>,
        sink: Arc<dyn EventSink>,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            state: Mutex::new(State::default()),
            event_turn: Mutex::new(()),
            wake: Condvar::new(),
            stopping: AtomicBool::new(false),
            adapter,
            sink,
            settings,
        }
    }

    /// Locks the state. A panic while holding the lock cannot leave the queue
    /// and membership set out of step (every mutation is a single call), so a
    /// poisoned lock is recovered.
    pub(super) fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bounded wait for a state change; returns the reacquired guard.
    pub(super) fn wait<'a>(&self, guard: MutexGuard<'a, State>) -> MutexGuard<'a, State> {
        match self.wake.wait_timeout(guard, self.settings.idle_poll()) {
            Ok((guard, _)) => guard,
            Err(poisoned) => poisoned.into_inner().0,
        }
    }

    pub(super) fn notify(&self) {
        self.wake.notify_all();
    }

    pub(super) fn queue_size(&self) -> usize {
        self.lock().queue.len()
    }

    pub(super) fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::Acquire)
    }

    /// Sets the stop flag, optionally cancels the running job, and wakes the worker.
    pub(super) fn signal_stop(&self, cancel_in_progress: bool) {
        let mut state = self.lock();
        state.closed = true;
        self.stopping.store(true, Ordering::Release);
        if cancel_in_progress {
            state.cancel_running_if(|_| true);
        }
        drop(state);
        self.notify();
    }

    /// Takes the event turn. Callers hold it across their state change and
    /// the matching [`deliver`](Self::deliver), so a job's `queue` event
    /// always reaches the sink before the worker's `start` for that job.
    pub(super) fn event_turn(&self) -> MutexGuard<'_, ()> {
        self.event_turn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Waits for the event turn, then delivers. Must not be called with the
    /// state lock held.
    pub(super) fn emit(&self, event: SchedulerEvent) {
        let _turn = self.event_turn();
        self.deliver(event);
    }

    /// Delivers an event to the sink while the caller holds the event turn.
    /// Sink errors and panics are logged, never propagated.
    pub(super) fn deliver(&self, event: SchedulerEvent) {
        let kind = event.kind();
        match panic::catch_unwind(AssertUnwindSafe(|| self.sink.emit(&event))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(kind, "event sink failed: {:#}", e),
            Err(_) => tracing::warn!(kind, "event sink panicked"),
        }
    }
}
