//! Per-request enqueue options and the player's priority presets.

use crate::job::new_request_id;

/// User asked for this now: preempts everything else.
pub const FOCUS_PRIORITY: i32 = 0;
/// The user is playing from this playlist.
pub const PREFETCH_PRIORITY: i32 = 10;
/// Passive startup/background fetching.
pub const BACKGROUND_PRIORITY: i32 = 100;

/// How a batch of tracks is admitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnqueueOptions {
    pub request_id: String,
    /// Lower is more urgent.
    pub priority: i32,
    /// Playlist label for tracks that don't carry one.
    pub default_playlist: String,
    /// Clear the whole queue before admitting this batch.
    pub replace: bool,
    /// With `replace`, also cancel the running job.
    pub cancel_running: bool,
    pub label: String,
}

impl EnqueueOptions {
    pub fn new(request_id: impl Into<String>, priority: i32) -> Self {
        Self {
            request_id: request_id.into(),
            priority,
            default_playlist: String::new(),
            replace: false,
            cancel_running: false,
            label: String::new(),
        }
    }

    /// "Download this now": highest priority, replaces the queue and cancels
    /// the running job.
    pub fn focus(playlist: &str) -> Self {
        let label = if playlist.is_empty() {
            "Download".to_string()
        } else {
            format!("Download '{}'", playlist)
        };
        Self::new(new_request_id("FOCUS"), FOCUS_PRIORITY)
            .with_default_playlist(playlist)
            .with_label(label)
            .replacing(true)
    }

    /// Prefetch of the playlist being played.
    pub fn prefetch(playlist: &str) -> Self {
        let label = if playlist.is_empty() {
            "Prefetch".to_string()
        } else {
            format!("Prefetch '{}'", playlist)
        };
        Self::new(new_request_id("PLAY"), PREFETCH_PRIORITY)
            .with_default_playlist(playlist)
            .with_label(label)
    }

    /// Low-priority auto-download. Callers keep one `request_id` (e.g. from
    /// `new_request_id("AUTO")`) for the whole session.
    pub fn background(request_id: impl Into<String>) -> Self {
        Self::new(request_id, BACKGROUND_PRIORITY).with_label("Auto-download")
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_default_playlist(mut self, playlist: impl Into<String>) -> Self {
        self.default_playlist = playlist.into();
        self
    }

    /// Sets `replace`, and `cancel_running` as given.
    pub fn replacing(mut self, cancel_running: bool) -> Self {
        self.replace = true;
        self.cancel_running = cancel_running;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_preempts_everything() {
        let opts = EnqueueOptions::focus("Road Trip");
        assert!(opts.request_id.starts_with("FOCUS-"));
        assert_eq!(opts.priority, FOCUS_PRIORITY);
        assert!(opts.replace && opts.cancel_running);
        assert_eq!(opts.label, "Download 'Road Trip'");
        assert_eq!(opts.default_playlist, "Road Trip");
        assert_eq!(EnqueueOptions::focus("").label, "Download");
    }

    #[test]
    fn prefetch_and_background_do_not_replace() {
        let play = EnqueueOptions::prefetch("Mix");
        assert!(play.request_id.starts_with("PLAY-"));
        assert_eq!(play.priority, PREFETCH_PRIORITY);
        assert!(!play.replace && !play.cancel_running);

        let auto = EnqueueOptions::background("AUTO-0000abcd");
        assert_eq!(auto.request_id, "AUTO-0000abcd");
        assert_eq!(auto.priority, BACKGROUND_PRIORITY);
        assert_eq!(auto.label, "Auto-download");
        assert!(!auto.replace);
    }
}
