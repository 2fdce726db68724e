//! Per-request counters (total/done/failed/canceled).
//!
//! Entries are created on the first successful admission for a request id and
//! kept for the lifetime of the scheduler.

use serde::Serialize;
use std::collections::HashMap;

/// Aggregate outcome counters for one logical request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestStats {
    pub request_id: String,
    /// Priority the request was first admitted with (informational).
    pub priority: i32,
    pub label: String,
    pub total: usize,
    pub done: usize,
    pub failed: usize,
    pub canceled: usize,
}

impl RequestStats {
    /// Jobs that reached a terminal state.
    pub fn finished(&self) -> usize {
        self.done + self.failed + self.canceled
    }

    /// 1-based ordinal of the next job of this request to run.
    pub fn next_position(&self) -> usize {
        self.finished() + 1
    }
}

#[derive(Debug, Default)]
pub struct RequestLedger {
    entries: HashMap<String, RequestStats>,
}

impl RequestLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` admitted jobs, creating the entry if needed. The priority
    /// and label of an existing entry are left untouched.
    pub fn record_admitted(&mut self, request_id: &str, priority: i32, label: &str, count: usize) {
        let stats = self
            .entries
            .entry(request_id.to_string())
            .or_insert_with(|| RequestStats {
                request_id: request_id.to_string(),
                priority,
                label: label.to_string(),
                ..RequestStats::default()
            });
        stats.total += count;
    }

    pub fn record_done(&mut self, request_id: &str) {
        if let Some(stats) = self.entries.get_mut(request_id) {
            stats.done += 1;
        }
    }

    pub fn record_failed(&mut self, request_id: &str) {
        if let Some(stats) = self.entries.get_mut(request_id) {
            stats.failed += 1;
        }
    }

    pub fn record_canceled(&mut self, request_id: &str, count: usize) {
        if let Some(stats) = self.entries.get_mut(request_id) {
            stats.canceled += count;
        }
    }

    pub fn get(&self, request_id: &str) -> Option<&RequestStats> {
        self.entries.get(request_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
