//! Event sink that records everything and lets tests wait for conditions.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use tunecache_core::events::{EventSink, SchedulerEvent};

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SchedulerEvent>>,
    changed: Condvar,
    /// Panic instead of recording events of this kind.
    panic_on: Option<&'static str>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn panicking_on(kind: &'static str) -> Arc<Self> {
        Arc::new(Self {
            panic_on: Some(kind),
            ..Self::default()
        })
    }

    pub fn events(&self) -> Vec<SchedulerEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.events().iter().map(SchedulerEvent::kind).collect()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.events().iter().filter(|e| e.kind() == kind).count()
    }

    /// Source keys of jobs in the order their events of `kind` arrived.
    pub fn keys_for(&self, kind: &str) -> Vec<String> {
        self.events()
            .iter()
            .filter(|e| e.kind() == kind)
            .filter_map(|e| e.job().map(|j| j.source_key.clone()))
            .collect()
    }

    /// Waits until `pred` holds for the recorded events. Returns false on timeout.
    pub fn wait_for<F>(&self, timeout: Duration, pred: F) -> bool
    where
        F: Fn(&[SchedulerEvent]) -> bool,
    {
        let deadline = Instant::now() + timeout;
        let mut events = self.events.lock().unwrap();
        loop {
            if pred(&events) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            events = self.changed.wait_timeout(events, deadline - now).unwrap().0;
        }
    }

    pub fn wait_for_kind(&self, timeout: Duration, kind: &str, n: usize) -> bool {
        self.wait_for(timeout, |events| {
            events.iter().filter(|e| e.kind() == kind).count() >= n
        })
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &SchedulerEvent) -> anyhow::Result<()> {
        if self.panic_on == Some(event.kind()) {
            panic!("sink refuses {} events", event.kind());
        }
        self.events.lock().unwrap().push(event.clone());
        self.changed.notify_all();
        Ok(())
    }
}
