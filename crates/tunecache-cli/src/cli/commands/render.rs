//! Human-readable rendering of scheduler events.

use anyhow::Result;
use tunecache_core::events::SchedulerEvent;

const MIB: f64 = 1024.0 * 1024.0;

/// Prints one event: a JSON line with `json`, else a human line (if any).
pub fn print_event(event: &SchedulerEvent, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(event)?);
    } else if let Some(line) = render_line(event) {
        println!("{line}");
    }
    Ok(())
}

/// One-line summary of an event. Idle renders nothing.
pub fn render_line(event: &SchedulerEvent) -> Option<String> {
    let line = match event {
        SchedulerEvent::Queue {
            request_id,
            added,
            queue_size,
        } => format!("Queued {added} track(s) for {request_id} ({queue_size} pending)"),
        SchedulerEvent::Start {
            job,
            position,
            total,
            label,
            ..
        } => format!("[{position}/{total}] {label}: {}", job.display_name()),
        SchedulerEvent::Progress {
            percent,
            downloaded,
            total_bytes,
            ..
        } => {
            if *total_bytes > 0 {
                format!(
                    "  {:.1} / {:.1} MiB ({:.1}%)",
                    *downloaded as f64 / MIB,
                    *total_bytes as f64 / MIB,
                    percent
                )
            } else {
                format!("  {:.1}%", percent)
            }
        }
        SchedulerEvent::Complete { job, path, .. } => {
            format!("  done: {} -> {}", job.display_name(), path.display())
        }
        SchedulerEvent::Canceled { job, .. } => format!("  canceled: {}", job.display_name()),
        SchedulerEvent::Error { job, error, .. } => {
            format!("  failed: {}: {error}", job.display_name())
        }
        SchedulerEvent::CancelAll => "Canceled all pending tracks".to_string(),
        SchedulerEvent::CancelRequest {
            request_id,
            removed,
        } => format!("Canceled {removed} pending track(s) of {request_id}"),
        SchedulerEvent::CancelPlaylist { playlist, removed } => {
            format!("Canceled {removed} pending track(s) of playlist '{playlist}'")
        }
        SchedulerEvent::Idle => return None,
    };
    Some(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tunecache_core::job::{Job, TrackSpec};

    fn job(title: Option<&str>) -> Job {
        let mut spec = TrackSpec::new("/music/a.flac");
        if let Some(t) = title {
            spec = spec.with_title(t);
        }
        Job::from_spec(spec, "CLI-00000001", 10, "", 0)
    }

    #[test]
    fn progress_shows_mib_when_size_known() {
        let ev = SchedulerEvent::Progress {
            job: job(None),
            percent: 50.0,
            downloaded: 1024 * 1024,
            total_bytes: 2 * 1024 * 1024,
            position: 1,
            total: 1,
            queue_size: 0,
        };
        assert_eq!(render_line(&ev).unwrap(), "  1.0 / 2.0 MiB (50.0%)");
    }

    #[test]
    fn progress_without_size_shows_percent_only() {
        let ev = SchedulerEvent::Progress {
            job: job(None),
            percent: 12.5,
            downloaded: 0,
            total_bytes: 0,
            position: 1,
            total: 1,
            queue_size: 0,
        };
        assert_eq!(render_line(&ev).unwrap(), "  12.5%");
    }

    #[test]
    fn start_uses_label_and_title() {
        let ev = SchedulerEvent::Start {
            job: job(Some("Song")),
            position: 2,
            total: 3,
            queue_size: 1,
            label: "Fetch".into(),
        };
        assert_eq!(render_line(&ev).unwrap(), "[2/3] Fetch: Song");
    }

    #[test]
    fn complete_names_cache_path() {
        let ev = SchedulerEvent::Complete {
            job: job(Some("Song")),
            path: PathBuf::from("/cache/Song.flac"),
            position: 1,
            total: 1,
            queue_size: 0,
        };
        assert_eq!(render_line(&ev).unwrap(), "  done: Song -> /cache/Song.flac");
    }

    #[test]
    fn idle_is_silent() {
        assert!(render_line(&SchedulerEvent::Idle).is_none());
    }
}
