//! Heap ordering for pending jobs.

use std::cmp::Ordering;

use crate::job::Job;

/// Wraps a job so `BinaryHeap` (a max-heap) pops the lowest
/// `(priority, sequence)` first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct QueueEntry(pub(super) Job);

impl QueueEntry {
    fn key(&self) -> (i32, u64) {
        (self.0.priority, self.0.sequence)
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
