#![allow(dead_code)]

pub mod recording_sink;
pub mod stub_adapter;

use std::sync::Arc;
use std::time::Duration;

use tunecache_core::events::EventSink;
use tunecache_core::fetch::FetchAdapter;
use tunecache_core::scheduler::{DownloadScheduler, SchedulerSettings};

pub use recording_sink::RecordingSink;
pub use stub_adapter::{Behavior, Gate, StubAdapter};

/// Generous upper bound for waiting on worker events in tests.
pub const WAIT: Duration = Duration::from_secs(5);

pub fn fast_settings() -> SchedulerSettings {
    SchedulerSettings::default()
        .with_idle_poll(Duration::from_millis(20))
        .with_join_timeout(Duration::from_millis(500))
}

pub fn scheduler_with(
    adapter: &Arc<StubAdapter>,
    sink: &Arc<RecordingSink>,
    settings: SchedulerSettings,
) -> DownloadScheduler {
    let adapter: Arc<dyn FetchAdapter> = adapter.clone();
    let sink: Arc<dyn EventSink> = sink.clone();
    DownloadScheduler::new(adapter, sink, settings)
}
