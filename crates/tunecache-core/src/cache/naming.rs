//! Cache file stems: readable `Artist_Title` names, hashed fallback.

use sha2::{Digest, Sha256};

/// Longest readable stem kept, in bytes.
const MAX_STEM_LEN: usize = 80;

/// Artist value treated as absent.
const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Builds a filesystem-safe stem from title and artist.
///
/// Keeps ASCII letters, digits and underscores; whitespace runs become one
/// `_`, artist and title are joined with `_`, and the result is trimmed of
/// underscores and cut to 80 bytes. Returns `None` when nothing usable remains.
pub fn readable_stem(title: &str, artist: Option<&str>) -> Option<String> {
    let mut parts = Vec::with_capacity(2);
    if let Some(artist) = artist.filter(|a| !a.is_empty() && *a != UNKNOWN_ARTIST) {
        parts.push(clean_part(artist));
    }
    parts.push(clean_part(title));

    let joined = parts
        .iter()
        .filter(|p| !p.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("_");
    let collapsed = collapse_underscores(&joined);
    let trimmed = collapsed.trim_matches('_');
    if trimmed.is_empty() {
        return None;
    }
    // ASCII only, so any byte index is a char boundary.
    let cut = &trimmed[..trimmed.len().min(MAX_STEM_LEN)];
    Some(cut.trim_end_matches('_').to_string())
}

/// First 16 hex chars of SHA-256 of the source key.
pub fn hashed_stem(source_key: &str) -> String {
    let digest = Sha256::digest(source_key.as_bytes());
    hex::encode(digest)[..16].to_string()
}

fn clean_part(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !prev_space {
                out.push('_');
            }
            prev_space = true;
        } else if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
            prev_space = false;
        }
    }
    out
}

fn collapse_underscores(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_underscore = false;
    for c in s.chars() {
        if c == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }
    out
}
