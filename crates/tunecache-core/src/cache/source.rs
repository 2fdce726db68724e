//! Resolve source keys (`file://` URLs or plain paths) to local files.

use anyhow::{bail, Result};
use std::path::PathBuf;
use url::Url;

/// Extension used when the source has none.
pub const DEFAULT_EXTENSION: &str = "m4a";

/// Local path behind a source key. Other URL schemes need a network adapter.
pub fn local_path(source_key: &str) -> Result<PathBuf> {
    match Url::parse(source_key) {
        Ok(url) if url.scheme() == "file" => url
            .to_file_path()
            .map_err(|()| anyhow::anyhow!("not a local file URL: {}", source_key)),
        // Windows drive letters parse as a one-letter scheme.
        Ok(url) if url.scheme().len() > 1 => {
            bail!("unsupported source scheme '{}': {}", url.scheme(), source_key)
        }
        _ => Ok(PathBuf::from(source_key)),
    }
}

/// Lower-cased extension of the source, or [`DEFAULT_EXTENSION`].
pub fn extension(source_key: &str) -> String {
    local_path(source_key)
        .ok()
        .and_then(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
                .map(str::to_ascii_lowercase)
        })
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}
