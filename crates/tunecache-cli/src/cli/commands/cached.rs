//! `tunecache cached` – report whether a track is already in the cache.

use anyhow::Result;
use std::path::PathBuf;
use tunecache_core::cache::DirCache;
use tunecache_core::config::TuneCacheConfig;
use tunecache_core::fetch::FetchRequest;

pub fn run_cached(
    cfg: &TuneCacheConfig,
    source: &str,
    title: Option<&str>,
    artist: Option<&str>,
    cache_dir: Option<PathBuf>,
) -> Result<()> {
    let cache = match cache_dir {
        Some(dir) => DirCache::new(dir),
        None => DirCache::from_config(cfg)?,
    };
    let request = FetchRequest {
        source_key: source,
        title: title.filter(|t| !t.is_empty()),
        artist: artist.filter(|a| !a.is_empty()),
    };

    match cache.cached_path(&request) {
        Some(path) => println!("cached: {}", path.display()),
        None => println!(
            "not cached (would be stored at {})",
            cache.target_path(&request).display()
        ),
    }
    Ok(())
}
