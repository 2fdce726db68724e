//! Rate limiting of outgoing progress events for one job.

use std::time::{Duration, Instant};

use crate::fetch::TransferProgress;

/// Lets through at most one progress update per `interval`, plus every
/// terminal (>= 100%) update.
#[derive(Debug)]
pub(super) struct ProgressThrottle {
    interval: Duration,
    last_emit: Option<Instant>,
}

impl ProgressThrottle {
    pub(super) fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emit: None,
        }
    }

    /// Whether `progress` should be emitted at `now`; records the emission if so.
    pub(super) fn admit(&mut self, progress: &TransferProgress, now: Instant) -> bool {
        let due = match self.last_emit {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        };
        if due || progress.is_terminal() {
            self.last_emit = Some(now);
            return true;
        }
        false
    }
}
