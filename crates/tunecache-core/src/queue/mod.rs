//! Pending jobs ordered by `(priority, sequence)`, with a membership set of
//! source keys kept in lock-step for O(1) dedupe at admission.

mod entry;

use std::collections::{BinaryHeap, HashSet};

use crate::job::Job;
use entry::QueueEntry;

#[derive(Debug, Default)]
pub struct PendingQueue {
    heap: BinaryHeap<QueueEntry>,
    members: HashSet<String>,
    next_sequence: u64,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out the next admission sequence number. Never reused.
    pub fn next_sequence(&mut self) -> u64 {
        let seq = self.next_sequence;
        self.next_sequence += 1;
        seq
    }

    pub fn contains(&self, source_key: &str) -> bool {
        self.members.contains(source_key)
    }

    /// Inserts the job unless its source key is already queued.
    /// Returns whether it was inserted.
    pub fn push(&mut self, job: Job) -> bool {
        if !self.members.insert(job.source_key.clone()) {
            return false;
        }
        self.heap.push(QueueEntry(job));
        true
    }

    /// Removes and returns the most urgent job.
    pub fn pop(&mut self) -> Option<Job> {
        let QueueEntry(job) = self.heap.pop()?;
        self.members.remove(&job.source_key);
        Some(job)
    }

    /// Empties the queue, returning the removed jobs in no particular order.
    pub fn drain(&mut self) -> Vec<Job> {
        self.members.clear();
        std::mem::take(&mut self.heap)
            .into_vec()
            .into_iter()
            .map(|QueueEntry(job)| job)
            .collect()
    }

    /// Removes every job matching `pred`; the rest keep their order.
    pub fn remove_where<F>(&mut self, mut pred: F) -> Vec<Job>
    where
        F: FnMut(&Job) -> bool,
    {
        let (removed, kept): (Vec<QueueEntry>, Vec<QueueEntry>) = std::mem::take(&mut self.heap)
            .into_vec()
            .into_iter()
            .partition(|entry| pred(&entry.0));
        self.heap = BinaryHeap::from(kept);
        removed
            .into_iter()
            .map(|QueueEntry(job)| {
                self.members.remove(&job.source_key);
                job
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::TrackSpec;

    fn push(queue: &mut PendingQueue, key: &str, request: &str, priority: i32) -> bool {
        let seq = queue.next_sequence();
        queue.push(Job::from_spec(TrackSpec::new(key), request, priority, "", seq))
    }

    fn drain_order(queue: &mut PendingQueue) -> Vec<String> {
        std::iter::from_fn(|| queue.pop()).map(|j| j.source_key).collect()
    }

    #[test]
    fn pops_by_priority_then_arrival() {
        let mut q = PendingQueue::new();
        push(&mut q, "ten", "r", 10);
        push(&mut q, "zero", "r", 0);
        push(&mut q, "five", "r", 5);
        push(&mut q, "five-later", "r", 5);
        assert_eq!(drain_order(&mut q), ["zero", "five", "five-later", "ten"]);
        assert!(q.is_empty());
    }

    #[test]
    fn rejects_duplicate_keys_until_popped() {
        let mut q = PendingQueue::new();
        assert!(push(&mut q, "a", "r", 1));
        assert!(!push(&mut q, "a", "r", 0));
        assert_eq!(q.len(), 1);
        q.pop();
        assert!(!q.contains("a"));
        assert!(push(&mut q, "a", "r", 1));
    }

    #[test]
    fn remove_where_keeps_membership_in_step() {
        let mut q = PendingQueue::new();
        push(&mut q, "a", "keep", 2);
        push(&mut q, "b", "drop", 1);
        push(&mut q, "c", "keep", 0);
        push(&mut q, "d", "drop", 3);
        let removed = q.remove_where(|job| job.request_id == "drop");
        assert_eq!(removed.len(), 2);
        assert!(!q.contains("b"));
        assert!(!q.contains("d"));
        assert!(q.contains("a"));
        assert_eq!(drain_order(&mut q), ["c", "a"]);
    }

    #[test]
    fn drain_clears_everything() {
        let mut q = PendingQueue::new();
        push(&mut q, "a", "r", 0);
        push(&mut q, "b", "r", 0);
        assert_eq!(q.drain().len(), 2);
        assert!(q.is_empty());
        assert!(!q.contains("a"));
        // Sequence numbers keep increasing across a drain.
        assert_eq!(q.next_sequence(), 2);
    }
}
