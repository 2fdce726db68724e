//! Track descriptors, queued jobs, and request identifiers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fetch::FetchRequest;

/// Caller-facing description of one track to fetch.
///
/// Deserializes from playlist-style JSON objects; `url` and `_playlist` are
/// accepted as aliases so player playlist entries can be fed in directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSpec {
    /// Unique key of the source (usually a URL). Used for dedupe.
    #[serde(alias = "url")]
    pub source_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, alias = "_playlist", skip_serializing_if = "Option::is_none")]
    pub playlist: Option<String>,
}

impl TrackSpec {
    pub fn new(source_key: impl Into<String>) -> Self {
        Self {
            source_key: source_key.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_playlist(mut self, playlist: impl Into<String>) -> Self {
        self.playlist = Some(playlist.into());
        self
    }

    /// True when the descriptor has no usable source key and must be dropped.
    pub fn is_blank(&self) -> bool {
        self.source_key.trim().is_empty()
    }

    pub fn fetch_request(&self) -> FetchRequest<'_> {
        FetchRequest {
            source_key: &self.source_key,
            title: non_empty(self.title.as_deref()),
            artist: non_empty(self.artist.as_deref()),
        }
    }
}

/// One admitted fetch. Immutable once created; `sequence` only breaks
/// priority ties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub source_key: String,
    pub title: String,
    pub artist: String,
    pub playlist: String,
    pub request_id: String,
    pub priority: i32,
    pub sequence: u64,
}

impl Job {
    /// Builds a job from a descriptor; `default_playlist` applies when the
    /// descriptor carries none.
    pub fn from_spec(
        spec: TrackSpec,
        request_id: &str,
        priority: i32,
        default_playlist: &str,
        sequence: u64,
    ) -> Self {
        let playlist = spec
            .playlist
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| default_playlist.to_string());
        Self {
            source_key: spec.source_key,
            title: spec.title.unwrap_or_default(),
            artist: spec.artist.unwrap_or_default(),
            playlist,
            request_id: request_id.to_string(),
            priority,
            sequence,
        }
    }

    pub fn fetch_request(&self) -> FetchRequest<'_> {
        FetchRequest {
            source_key: &self.source_key,
            title: non_empty(Some(&self.title)),
            artist: non_empty(Some(&self.artist)),
        }
    }

    /// Title for log lines and CLI output, falling back to the source key.
    pub fn display_name(&self) -> &str {
        if self.title.is_empty() {
            &self.source_key
        } else {
            &self.title
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.is_empty())
}

/// Returns `<prefix>-<8 hex digits>` taken from a random v4 UUID.
pub fn new_request_id(prefix: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, &hex[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn request_ids_are_prefixed_and_unique() {
        let ids: HashSet<String> = (0..100).map(|_| new_request_id("PLAY")).collect();
        assert_eq!(ids.len(), 100);
        for id in &ids {
            let (prefix, hex) = id.split_once('-').unwrap();
            assert_eq!(prefix, "PLAY");
            assert_eq!(hex.len(), 8);
            assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn job_falls_back_to_default_playlist() {
        let job = Job::from_spec(TrackSpec::new("a"), "r1", 5, "Road Trip", 0);
        assert_eq!(job.playlist, "Road Trip");
        let job = Job::from_spec(
            TrackSpec::new("a").with_playlist("Gym"),
            "r1",
            5,
            "Road Trip",
            0,
        );
        assert_eq!(job.playlist, "Gym");
    }

    #[test]
    fn fetch_request_drops_empty_metadata() {
        let job = Job::from_spec(TrackSpec::new("a").with_title(""), "r", 0, "", 0);
        let req = job.fetch_request();
        assert_eq!(req.source_key, "a");
        assert!(req.title.is_none());
        assert!(req.artist.is_none());
        assert_eq!(job.display_name(), "a");
    }

    #[test]
    fn track_spec_accepts_playlist_aliases() {
        let json = r#"[
            {"url": "https://example.com/watch?v=1", "title": "One", "_playlist": "Mix"},
            {"source_key": "file:///music/two.m4a", "artist": "Band"}
        ]"#;
        let specs: Vec<TrackSpec> = serde_json::from_str(json).unwrap();
        assert_eq!(specs[0].source_key, "https://example.com/watch?v=1");
        assert_eq!(specs[0].playlist.as_deref(), Some("Mix"));
        assert_eq!(specs[1].artist.as_deref(), Some("Band"));
        assert!(specs[1].title.is_none());
    }

    #[test]
    fn blank_source_keys_are_detected() {
        assert!(TrackSpec::new("   ").is_blank());
        assert!(!TrackSpec::new("x").is_blank());
    }
}
