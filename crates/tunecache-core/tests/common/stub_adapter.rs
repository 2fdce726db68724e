//! Scriptable fetch adapter: per-key behaviors, cached set, call log.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tunecache_core::control::CancelToken;
use tunecache_core::fetch::{
    FetchAdapter, FetchError, FetchRequest, ProgressFn, ProgressSignal, TransferProgress,
};

/// Upper bound on how long a blocking behavior may hold the worker.
const STUCK_LIMIT: Duration = Duration::from_secs(10);

/// One-shot latch used to release a blocked download.
#[derive(Default)]
pub struct Gate {
    open: Mutex<bool>,
    cv: Condvar,
}

impl Gate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn open(&self) {
        *self.open.lock().unwrap() = true;
        self.cv.notify_all();
    }

    fn wait(&self, timeout: Duration) {
        let guard = self.open.lock().unwrap();
        let _ = self
            .cv
            .wait_timeout_while(guard, timeout, |open| !*open)
            .unwrap();
    }
}

#[derive(Clone)]
pub enum Behavior {
    Succeed,
    Fail(&'static str),
    /// Report these percentages back-to-back, then succeed.
    Burst(Vec<f64>),
    /// Report progress every few ms until told to cancel.
    UntilCancelled,
    /// Block until the gate opens, never checking for cancellation.
    IgnoreCancel(Arc<Gate>),
    Panic,
}

#[derive(Default)]
pub struct StubAdapter {
    behaviors: Mutex<HashMap<String, Behavior>>,
    cached: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
}

impl StubAdapter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(&self, key: &str, behavior: Behavior) {
        self.behaviors
            .lock()
            .unwrap()
            .insert(key.to_string(), behavior);
    }

    pub fn mark_cached(&self, key: &str) {
        self.cached.lock().unwrap().insert(key.to_string());
    }

    /// Source keys passed to `download`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl FetchAdapter for StubAdapter {
    fn is_cached(&self, request: &FetchRequest<'_>) -> bool {
        self.cached.lock().unwrap().contains(request.source_key)
    }

    fn download(
        &self,
        request: &FetchRequest<'_>,
        cancel: &CancelToken,
        progress: &mut ProgressFn<'_>,
    ) -> Result<PathBuf, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push(request.source_key.to_string());
        let behavior = self
            .behaviors
            .lock()
            .unwrap()
            .get(request.source_key)
            .cloned()
            .unwrap_or(Behavior::Succeed);
        let path = PathBuf::from(format!("/cache/{}.m4a", request.source_key));

        match behavior {
            Behavior::Succeed => Ok(path),
            Behavior::Fail(msg) => Err(FetchError::Failed(anyhow::anyhow!(msg))),
            Behavior::Burst(steps) => {
                for pct in steps {
                    let update = TransferProgress::new(pct, pct as u64 * 10, 1000);
                    if progress(update) == ProgressSignal::Cancel {
                        return Err(FetchError::Cancelled);
                    }
                }
                Ok(path)
            }
            Behavior::UntilCancelled => {
                let started = Instant::now();
                let mut done = 0u64;
                while started.elapsed() < STUCK_LIMIT {
                    if cancel.is_cancelled() {
                        return Err(FetchError::Cancelled);
                    }
                    done = (done + 1) % 999;
                    if progress(TransferProgress::from_bytes(done, 1000)) == ProgressSignal::Cancel {
                        return Err(FetchError::Cancelled);
                    }
                    thread::sleep(Duration::from_millis(5));
                }
                Err(FetchError::Failed(anyhow::anyhow!("stub never cancelled")))
            }
            Behavior::IgnoreCancel(gate) => {
                gate.wait(STUCK_LIMIT);
                Ok(path)
            }
            Behavior::Panic => panic!("adapter blew up on {}", request.source_key),
        }
    }
}
