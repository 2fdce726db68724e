//! Directory-backed track cache.
//!
//! [`DirCache`] is a [`FetchAdapter`] whose sources are local files or
//! `file://` URLs: a "download" is a chunked copy into the cache directory,
//! written to a `.part` file and renamed into place once complete, so a
//! cancelled or failed copy never looks cached.

mod naming;
mod source;

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::config::TuneCacheConfig;
use crate::control::CancelToken;
use crate::fetch::{
    FetchAdapter, FetchError, FetchRequest, ProgressFn, ProgressSignal, TransferProgress,
};

pub use naming::{hashed_stem, readable_stem};
pub use source::{local_path, DEFAULT_EXTENSION};

/// Default copy buffer size.
pub const DEFAULT_CHUNK_BYTES: usize = 64 * 1024;

/// Path of the in-progress file: appends `.part` to the final path.
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(".part");
    PathBuf::from(o)
}

#[derive(Debug, Clone)]
pub struct DirCache {
    dir: PathBuf,
    chunk_bytes: usize,
}

impl DirCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            chunk_bytes: DEFAULT_CHUNK_BYTES,
        }
    }

    /// Cache at the configured (or XDG default) directory.
    pub fn from_config(cfg: &TuneCacheConfig) -> Result<Self> {
        let mut cache = Self::new(cfg.cache_dir()?);
        if let Some(n) = cfg.copy_chunk_bytes() {
            cache = cache.with_chunk_bytes(n);
        }
        Ok(cache)
    }

    pub fn with_chunk_bytes(mut self, chunk_bytes: usize) -> Self {
        self.chunk_bytes = chunk_bytes.max(1);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where the track is (or would be) stored: the readable name when the
    /// request has a usable title, else the hashed name.
    pub fn target_path(&self, request: &FetchRequest<'_>) -> PathBuf {
        self.candidates(request)
            .into_iter()
            .next()
            .unwrap_or_else(|| self.dir.join(hashed_stem(request.source_key)))
    }

    /// Existing cached file for the request, checking the readable name
    /// first and the hashed name second.
    pub fn cached_path(&self, request: &FetchRequest<'_>) -> Option<PathBuf> {
        self.candidates(request).into_iter().find(|p| p.is_file())
    }

    fn candidates(&self, request: &FetchRequest<'_>) -> Vec<PathBuf> {
        let ext = source::extension(request.source_key);
        let readable = request
            .title
            .and_then(|title| readable_stem(title, request.artist));
        readable
            .into_iter()
            .chain(std::iter::once(hashed_stem(request.source_key)))
            .map(|stem| self.dir.join(format!("{}.{}", stem, ext)))
            .collect()
    }

    fn copy_into(
        &self,
        input: &mut File,
        part: &Path,
        total: u64,
        cancel: &CancelToken,
        progress: &mut ProgressFn<'_>,
    ) -> Result<u64, FetchError> {
        let mut out =
            File::create(part).with_context(|| format!("create {}", part.display()))?;
        let mut buf = vec![0u8; self.chunk_bytes];
        let mut done = 0u64;

        loop {
            if cancel.is_cancelled() {
                return Err(FetchError::Cancelled);
            }
            let n = input.read(&mut buf).context("read source")?;
            if n == 0 {
                break;
            }
            out.write_all(&buf[..n])
                .with_context(|| format!("write {}", part.display()))?;
            done += n as u64;
            if done < total && progress(TransferProgress::from_bytes(done, total)) == ProgressSignal::Cancel {
                return Err(FetchError::Cancelled);
            }
        }

        out.sync_all()
            .with_context(|| format!("sync {}", part.display()))?;
        if progress(TransferProgress::new(100.0, done, total.max(done))) == ProgressSignal::Cancel {
            return Err(FetchError::Cancelled);
        }
        Ok(done)
    }
}

impl FetchAdapter for DirCache {
    fn is_cached(&self, request: &FetchRequest<'_>) -> bool {
        self.cached_path(request).is_some()
    }

    fn download(
        &self,
        request: &FetchRequest<'_>,
        cancel: &CancelToken,
        progress: &mut ProgressFn<'_>,
    ) -> Result<PathBuf, FetchError> {
        let src = local_path(request.source_key)?;
        let mut input =
            File::open(&src).with_context(|| format!("open source {}", src.display()))?;
        let total = input.metadata().map(|m| m.len()).unwrap_or(0);

        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create cache dir {}", self.dir.display()))?;
        let final_path = self.target_path(request);
        let part = temp_path(&final_path);

        match self.copy_into(&mut input, &part, total, cancel, progress) {
            Ok(bytes) => {
                fs::rename(&part, &final_path)
                    .with_context(|| format!("finalize {}", final_path.display()))?;
                tracing::debug!(bytes, path = %final_path.display(), "cached track");
                Ok(final_path)
            }
            Err(e) => {
                let _ = fs::remove_file(&part);
                Err(e)
            }
        }
    }
}
