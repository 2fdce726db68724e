//! CLI for the tunecache download scheduler.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tunecache_core::config;
use tunecache_core::scheduler::PREFETCH_PRIORITY;

use commands::{run_cached, run_config, run_fetch};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "tunecache")]
#[command(about = "tunecache: fetch tracks into the local player cache", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch tracks into the cache and report progress until done.
    Fetch(FetchArgs),

    /// Check whether a track is already cached.
    Cached {
        /// Track source (local path or file:// URL).
        source: String,
        /// Track title used for the cache file name.
        #[arg(long)]
        title: Option<String>,
        /// Track artist used for the cache file name.
        #[arg(long)]
        artist: Option<String>,
        /// Cache directory (default from config).
        #[arg(long, value_name = "DIR")]
        cache_dir: Option<PathBuf>,
    },

    /// Show the config file path and effective settings.
    Config,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Track sources: local paths or file:// URLs.
    pub sources: Vec<String>,

    /// JSON file with a list of tracks ({"url"|"source_key", "title", "artist", "_playlist"}).
    #[arg(long, value_name = "FILE")]
    pub tracks: Option<PathBuf>,

    /// Priority of this request (lower runs first).
    #[arg(long, default_value_t = PREFETCH_PRIORITY, allow_negative_numbers = true)]
    pub priority: i32,

    /// Playlist label for tracks that don't name one.
    #[arg(long)]
    pub playlist: Option<String>,

    /// Human label for the request.
    #[arg(long)]
    pub label: Option<String>,

    /// Clear pending work before queueing these tracks.
    #[arg(long)]
    pub replace: bool,

    /// With --replace, also cancel the track being fetched.
    #[arg(long, requires = "replace")]
    pub cancel_running: bool,

    /// Cache directory (default from config).
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Print events as JSON lines.
    #[arg(long)]
    pub json: bool,
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Fetch(args) => run_fetch(&cfg, args)?,
            CliCommand::Cached {
                source,
                title,
                artist,
                cache_dir,
            } => run_cached(&cfg, &source, title.as_deref(), artist.as_deref(), cache_dir)?,
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
