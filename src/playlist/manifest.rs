//! M3U manifest writer.
//!
//! Output is bit-exact for player compatibility:
//!
//! ```text
//! #EXTM3U
//! #EXTINF:<duration>,<title>
//! <absolute path>
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ErrorCode, ExportError, Result};
use crate::types::Track;

/// First line of every manifest.
pub const M3U_HEADER: &str = "#EXTM3U";

/// Manifest file extension.
pub const M3U_EXTENSION: &str = "m3u";

/// Turns a playlist title into a manifest file stem.
///
/// Only spaces are replaced. Characters that are illegal on some filesystems
/// pass through unchanged.
pub fn sanitize_file_name(name: &str) -> String {
    name.replace(' ', "_")
}

/// Returns the manifest path for `playlist_title` inside `out_dir`.
pub fn manifest_path(playlist_title: &str, out_dir: &Path) -> PathBuf {
    out_dir.join(format!(
        "{}.{}",
        sanitize_file_name(playlist_title),
        M3U_EXTENSION
    ))
}

/// Renders manifest content for `tracks` in the given order.
pub fn render_manifest(tracks: &[Track]) -> String {
    let mut out = String::with_capacity(16 + tracks.len() * 96);
    out.push_str(M3U_HEADER);
    out.push('\n');
    for track in tracks {
        out.push_str(&format!(
            "#EXTINF:{},{}\n{}\n",
            track.duration,
            track.title,
            track.path.display()
        ));
    }
    out
}

/// Writes the manifest for `tracks` and returns its path.
///
/// Creates the manifest's directory if needed and overwrites any existing
/// manifest. A `/` left in the title by the sanitizer nests the manifest one
/// level deeper under `out_dir`.
pub fn write_manifest(tracks: &[Track], playlist_title: &str, out_dir: &Path) -> Result<PathBuf> {
    let path = manifest_path(playlist_title, out_dir);
    let parent = path.parent().unwrap_or(out_dir);
    fs::create_dir_all(parent).map_err(|e| {
        ExportError::with_source(
            ErrorCode::ManifestWriteFailed,
            format!("Failed to create directory {}", parent.display()),
            e,
        )
    })?;

    fs::write(&path, render_manifest(tracks)).map_err(|e| {
        ExportError::with_source(
            ErrorCode::ManifestWriteFailed,
            format!("Failed to write {}", path.display()),
            e,
        )
    })?;

    log::info!("M3U created: {} ({} tracks)", path.display(), tracks.len());
    Ok(path)
}
