//! Lifecycle events emitted by the scheduler and the sinks that receive them.

use serde::Serialize;
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Mutex;

use crate::job::Job;

/// Structured scheduler event. Serializes as `{"type": "<kind>", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchedulerEvent {
    Queue {
        request_id: String,
        added: usize,
        queue_size: usize,
    },
    Start {
        job: Job,
        position: usize,
        total: usize,
        queue_size: usize,
        label: String,
    },
    Progress {
        job: Job,
        percent: f64,
        downloaded: u64,
        total_bytes: u64,
        position: usize,
        total: usize,
        queue_size: usize,
    },
    Complete {
        job: Job,
        path: PathBuf,
        position: usize,
        total: usize,
        queue_size: usize,
    },
    Canceled {
        job: Job,
        position: usize,
        total: usize,
        queue_size: usize,
    },
    Error {
        job: Job,
        error: String,
        position: usize,
        total: usize,
        queue_size: usize,
    },
    CancelAll,
    CancelRequest {
        request_id: String,
        removed: usize,
    },
    CancelPlaylist {
        playlist: String,
        removed: usize,
    },
    Idle,
}

impl SchedulerEvent {
    /// Short kind name, matching the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            SchedulerEvent::Queue { .. } => "queue",
            SchedulerEvent::Start { .. } => "start",
            SchedulerEvent::Progress { .. } => "progress",
            SchedulerEvent::Complete { .. } => "complete",
            SchedulerEvent::Canceled { .. } => "canceled",
            SchedulerEvent::Error { .. } => "error",
            SchedulerEvent::CancelAll => "cancel_all",
            SchedulerEvent::CancelRequest { .. } => "cancel_request",
            SchedulerEvent::CancelPlaylist { .. } => "cancel_playlist",
            SchedulerEvent::Idle => "idle",
        }
    }

    /// Request the event belongs to, when it has one.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            SchedulerEvent::Queue { request_id, .. }
            | SchedulerEvent::CancelRequest { request_id, .. } => Some(request_id),
            SchedulerEvent::Start { job, .. }
            | SchedulerEvent::Progress { job, .. }
            | SchedulerEvent::Complete { job, .. }
            | SchedulerEvent::Canceled { job, .. }
            | SchedulerEvent::Error { job, .. } => Some(&job.request_id),
            SchedulerEvent::CancelAll
            | SchedulerEvent::CancelPlaylist { .. }
            | SchedulerEvent::Idle => None,
        }
    }

    pub fn job(&self) -> Option<&Job> {
        match self {
            SchedulerEvent::Start { job, .. }
            | SchedulerEvent::Progress { job, .. }
            | SchedulerEvent::Complete { job, .. }
            | SchedulerEvent::Canceled { job, .. }
            | SchedulerEvent::Error { job, .. } => Some(job),
            _ => None,
        }
    }

    /// Complete, canceled and error end a job's event sequence.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SchedulerEvent::Complete { .. }
                | SchedulerEvent::Canceled { .. }
                | SchedulerEvent::Error { .. }
        )
    }
}

/// Receiver of scheduler events. Called synchronously, one event at a time,
/// from the worker and from enqueue/cancel callers, never with the scheduler
/// state locked. Implementations should return quickly. They may query the
/// scheduler (`is_downloading`, `snapshot`, `request_stats`) but must not
/// enqueue or cancel from inside `emit`. Errors are logged and otherwise ignored.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &SchedulerEvent) -> anyhow::Result<()>;
}

impl<F> EventSink for F
where
    F: Fn(&SchedulerEvent) -> anyhow::Result<()> + Send + Sync,
{
    fn emit(&self, event: &SchedulerEvent) -> anyhow::Result<()> {
        self(event)
    }
}

/// Forwards events into an mpsc channel, e.g. for a UI thread to drain.
pub struct ChannelSink {
    tx: Mutex<mpsc::Sender<SchedulerEvent>>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<SchedulerEvent>) -> Self {
        Self { tx: Mutex::new(tx) }
    }

    /// Creates a sink together with the receiving end.
    pub fn channel() -> (Self, mpsc::Receiver<SchedulerEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self::new(tx), rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: &SchedulerEvent) -> anyhow::Result<()> {
        let tx = self
            .tx
            .lock()
            .map_err(|_| anyhow::anyhow!("event channel lock poisoned"))?;
        tx.send(event.clone())
            .map_err(|_| anyhow::anyhow!("event receiver dropped"))
    }
}
