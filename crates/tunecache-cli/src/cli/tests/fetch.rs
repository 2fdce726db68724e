//! Tests for the fetch subcommand.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;

#[test]
fn cli_parse_fetch_sources() {
    match parse(&["tunecache", "fetch", "/music/a.flac", "file:///music/b.mp3"]) {
        CliCommand::Fetch(args) => {
            assert_eq!(args.sources, ["/music/a.flac", "file:///music/b.mp3"]);
            assert_eq!(args.priority, 10);
            assert!(args.tracks.is_none());
            assert!(args.playlist.is_none());
            assert!(!args.replace);
            assert!(!args.cancel_running);
            assert!(!args.json);
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn cli_parse_fetch_negative_priority() {
    match parse(&["tunecache", "fetch", "a.flac", "--priority", "-5"]) {
        CliCommand::Fetch(args) => assert_eq!(args.priority, -5),
        _ => panic!("expected Fetch with --priority"),
    }
}

#[test]
fn cli_parse_fetch_all_flags() {
    match parse(&[
        "tunecache",
        "fetch",
        "--tracks",
        "list.json",
        "--playlist",
        "Mix",
        "--label",
        "Warm",
        "--replace",
        "--cancel-running",
        "--cache-dir",
        "/tmp/cache",
        "--json",
    ]) {
        CliCommand::Fetch(args) => {
            assert!(args.sources.is_empty());
            assert_eq!(args.tracks.as_deref(), Some(std::path::Path::new("list.json")));
            assert_eq!(args.playlist.as_deref(), Some("Mix"));
            assert_eq!(args.label.as_deref(), Some("Warm"));
            assert!(args.replace);
            assert!(args.cancel_running);
            assert_eq!(
                args.cache_dir.as_deref(),
                Some(std::path::Path::new("/tmp/cache"))
            );
            assert!(args.json);
        }
        _ => panic!("expected Fetch with all flags"),
    }
}

#[test]
fn cli_cancel_running_requires_replace() {
    assert!(Cli::try_parse_from(["tunecache", "fetch", "a.flac", "--cancel-running"]).is_err());
}
