//! `tunecache fetch` – queue tracks, run the worker, print events until idle.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tunecache_core::cache::DirCache;
use tunecache_core::config::TuneCacheConfig;
use tunecache_core::events::{ChannelSink, SchedulerEvent};
use tunecache_core::job::{new_request_id, TrackSpec};
use tunecache_core::scheduler::{DownloadScheduler, EnqueueOptions, SchedulerSettings};

use super::render::print_event;
use crate::cli::FetchArgs;

pub fn run_fetch(cfg: &TuneCacheConfig, args: FetchArgs) -> Result<()> {
    let tracks = collect_tracks(&args)?;
    if tracks.is_empty() {
        bail!("nothing to fetch: pass SOURCE paths or --tracks FILE");
    }

    let cache = match &args.cache_dir {
        Some(dir) => {
            let cache = DirCache::new(dir);
            match cfg.copy_chunk_bytes() {
                Some(n) => cache.with_chunk_bytes(n),
                None => cache,
            }
        }
        None => DirCache::from_config(cfg)?,
    };
    tracing::info!("fetching into {}", cache.dir().display());

    let (sink, events) = ChannelSink::channel();
    let scheduler = DownloadScheduler::new(
        Arc::new(cache),
        Arc::new(sink),
        SchedulerSettings::from_config(cfg),
    );

    let opts = enqueue_options(&args);
    let added = scheduler.enqueue(tracks, &opts)?;
    if added == 0 {
        println!("Nothing to fetch: all tracks already cached.");
        scheduler.shutdown(false);
        return Ok(());
    }

    scheduler.start()?;
    while let Ok(event) = events.recv() {
        print_event(&event, args.json)?;
        if event == SchedulerEvent::Idle {
            break;
        }
    }
    scheduler.shutdown(true);

    let Some(stats) = scheduler.request_stats(&opts.request_id) else {
        return Ok(());
    };
    if !args.json {
        println!(
            "Fetched {}/{} track(s) ({} failed, {} canceled)",
            stats.done, stats.total, stats.failed, stats.canceled
        );
    }
    if stats.failed > 0 {
        bail!("{} track(s) failed", stats.failed);
    }
    Ok(())
}

/// Tracks from `--tracks FILE` followed by positional sources.
pub(crate) fn collect_tracks(args: &FetchArgs) -> Result<Vec<TrackSpec>> {
    let mut tracks = match &args.tracks {
        Some(path) => read_track_file(path)?,
        None => Vec::new(),
    };
    tracks.extend(args.sources.iter().map(TrackSpec::new));
    Ok(tracks)
}

fn read_track_file(path: &Path) -> Result<Vec<TrackSpec>> {
    let data = fs::read(path).with_context(|| format!("reading track list {}", path.display()))?;
    serde_json::from_slice(&data)
        .with_context(|| format!("parsing track list {}", path.display()))
}

pub(crate) fn enqueue_options(args: &FetchArgs) -> EnqueueOptions {
    let label = args.label.clone().unwrap_or_else(|| match &args.playlist {
        Some(p) => format!("Fetch '{p}'"),
        None => "Fetch".to_string(),
    });
    let mut opts = EnqueueOptions::new(new_request_id("CLI"), args.priority)
        .with_label(label)
        .with_default_playlist(args.playlist.clone().unwrap_or_default());
    if args.replace {
        opts = opts.replacing(args.cancel_running);
    }
    opts
}
