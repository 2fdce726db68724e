//! `tunecache config` – show where the config lives and what is in effect.

use anyhow::Result;
use tunecache_core::config::{self, TuneCacheConfig};
use tunecache_core::logging;

pub fn run_config(cfg: &TuneCacheConfig) -> Result<()> {
    println!("config file: {}", config::config_path()?.display());
    println!("log file: {}", logging::log_file_path()?.display());
    println!("cache dir: {}", cfg.cache_dir()?.display());
    println!(
        "progress throttle: {} ms",
        cfg.progress_throttle().as_millis()
    );
    println!(
        "shutdown timeout: {} ms",
        cfg.shutdown_timeout().as_millis()
    );
    println!("idle poll: {} ms", cfg.idle_poll().as_millis());
    if let Some(n) = cfg.copy_chunk_bytes() {
        println!("copy chunk: {n} bytes");
    }
    Ok(())
}
