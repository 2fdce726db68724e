//! Fetch adapter contract: cache lookup and the blocking transfer itself.
//!
//! The scheduler never holds its lock while calling into an adapter, so
//! implementations may block on disk or network I/O.

use std::path::PathBuf;

use crate::control::CancelToken;

/// What the adapter needs to locate or name a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest<'a> {
    pub source_key: &'a str,
    pub title: Option<&'a str>,
    pub artist: Option<&'a str>,
}

/// One progress report from an in-flight transfer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferProgress {
    /// Percent complete, 0..=100.
    pub percent: f64,
    pub downloaded: u64,
    /// Total size in bytes; 0 when unknown.
    pub total_bytes: u64,
}

impl TransferProgress {
    pub fn new(percent: f64, downloaded: u64, total_bytes: u64) -> Self {
        Self {
            percent,
            downloaded,
            total_bytes,
        }
    }

    /// Builds a report from byte counts. An unknown total reports 0%.
    pub fn from_bytes(downloaded: u64, total_bytes: u64) -> Self {
        let percent = if total_bytes == 0 {
            0.0
        } else {
            (downloaded as f64 / total_bytes as f64 * 100.0).min(100.0)
        };
        Self::new(percent, downloaded, total_bytes)
    }

    /// Terminal updates are never throttled.
    pub fn is_terminal(&self) -> bool {
        self.percent >= 100.0
    }
}

/// Answer from the progress callback to the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressSignal {
    Continue,
    /// Abort the transfer and return [`FetchError::Cancelled`].
    Cancel,
}

/// Failure modes of [`FetchAdapter::download`].
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The transfer stopped because cancellation was requested.
    #[error("download cancelled")]
    Cancelled,
    /// Any other failure; never retried by the scheduler.
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}

/// Progress callback handed to the adapter for one job.
pub type ProgressFn<'a> = dyn FnMut(TransferProgress) -> ProgressSignal + 'a;

/// Source of tracks. Implementations must be safe to call from the worker
/// thread and from enqueuing callers at the same time.
pub trait FetchAdapter: Send + Sync {
    /// Whether the track is already available locally. Used only at admission.
    fn is_cached(&self, request: &FetchRequest<'_>) -> bool;

    /// Performs the transfer and returns the local path of the cached track.
    ///
    /// Must call `progress` zero or more times and return
    /// [`FetchError::Cancelled`] once it answers [`ProgressSignal::Cancel`] or
    /// `cancel` is set.
    fn download(
        &self,
        request: &FetchRequest<'_>,
        cancel: &CancelToken,
        progress: &mut ProgressFn<'_>,
    ) -> Result<PathBuf, FetchError>;
}
