use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Smallest progress throttle interval the scheduler accepts.
pub const MIN_PROGRESS_THROTTLE_SECS: f64 = 0.05;

/// Local track cache settings (optional section in config.toml).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache directory; defaults to `~/.cache/tunecache/tracks`.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Copy buffer size in bytes (None = 64 KiB).
    #[serde(default)]
    pub copy_chunk_bytes: Option<usize>,
}

/// Global configuration loaded from `~/.config/tunecache/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuneCacheConfig {
    /// Minimum seconds between progress events for one job (floored at 0.05).
    pub progress_throttle_secs: f64,
    /// How long shutdown waits for the worker thread to exit.
    pub shutdown_timeout_secs: f64,
    /// Upper bound on how long the idle worker sleeps before re-checking for stop.
    pub idle_poll_ms: u64,
    #[serde(default)]
    pub cache: Option<CacheConfig>,
}

impl Default for TuneCacheConfig {
    fn default() -> Self {
        Self {
            progress_throttle_secs: 0.25,
            shutdown_timeout_secs: 2.0,
            idle_poll_ms: 500,
            cache: None,
        }
    }
}

impl TuneCacheConfig {
    /// Throttle interval with the floor applied. Non-finite values fall back to the default.
    pub fn progress_throttle(&self) -> Duration {
        let secs = if self.progress_throttle_secs.is_finite() {
            self.progress_throttle_secs
        } else {
            Self::default().progress_throttle_secs
        };
        Duration::from_secs_f64(secs.max(MIN_PROGRESS_THROTTLE_SECS))
    }

    pub fn shutdown_timeout(&self) -> Duration {
        let secs = self.shutdown_timeout_secs;
        if secs.is_finite() && secs >= 0.0 {
            Duration::from_secs_f64(secs)
        } else {
            Duration::from_secs_f64(Self::default().shutdown_timeout_secs)
        }
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms.max(1))
    }

    /// Configured cache dir, or the XDG cache default (created if missing).
    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = self.cache.as_ref().and_then(|c| c.dir.clone()) {
            return Ok(dir);
        }
        let xdg_dirs = xdg::BaseDirectories::with_prefix("tunecache")?;
        Ok(xdg_dirs.create_cache_directory("tracks")?)
    }

    pub fn copy_chunk_bytes(&self) -> Option<usize> {
        self.cache.as_ref().and_then(|c| c.copy_chunk_bytes)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("tunecache")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<TuneCacheConfig> {
    let path = config_path()?;
    load_or_init_at(&path)
}

/// Same as [`load_or_init`] with an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<TuneCacheConfig> {
    if !path.exists() {
        let default_cfg = TuneCacheConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: TuneCacheConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
