//! File naming rules for downloaded and transcoded tracks.
//!
//! Everything here is pure. The existence check takes the filesystem probe
//! as a parameter so it can be tested without touching disk.

use std::path::{Path, PathBuf};

use crate::types::TrackDescriptor;

/// Extensions treated as lossless, compared case-insensitively.
pub const LOSSLESS_EXTENSIONS: &[&str] = &["flac", "wav", "aiff", "aif", "ape", "wv"];

/// Extension of transcoded output.
pub const COMPRESSED_EXTENSION: &str = "mp3";

/// Suffix appended to files that are still being written.
pub const PARTIAL_SUFFIX: &str = ".part";

/// Returns true if `path` has a lossless extension.
pub fn is_lossless(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            LOSSLESS_EXTENSIONS
                .iter()
                .any(|lossless| ext.eq_ignore_ascii_case(lossless))
        })
        .unwrap_or(false)
}

/// Returns the compressed sibling of `path`: same directory and stem,
/// `.mp3` extension.
pub fn compressed_path(path: &Path) -> PathBuf {
    path.with_extension(COMPRESSED_EXTENSION)
}

/// Returns the in-progress name for `path`, e.g. `Song.mp3.part`.
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

/// Returns true if `path` is an in-progress file.
pub fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.ends_with(PARTIAL_SUFFIX))
        .unwrap_or(false)
}

/// Where the descriptor's file lands when downloaded into `out_dir`.
pub fn download_path(descriptor: &TrackDescriptor, out_dir: &Path) -> PathBuf {
    out_dir.join(&descriptor.file_name)
}

/// Where the descriptor's playable file ends up once fully processed.
///
/// Lossless names get the compressed extension; anything else is kept.
pub fn expected_final_path(descriptor: &TrackDescriptor, out_dir: &Path) -> PathBuf {
    let downloaded = download_path(descriptor, out_dir);
    if is_lossless(&downloaded) {
        compressed_path(&downloaded)
    } else {
        downloaded
    }
}

/// Returns the finished file for `descriptor` if `exists` reports one.
pub fn find_existing<F>(descriptor: &TrackDescriptor, out_dir: &Path, exists: F) -> Option<PathBuf>
where
    F: Fn(&Path) -> bool,
{
    let expected = expected_final_path(descriptor, out_dir);
    if exists(&expected) {
        Some(expected)
    } else {
        None
    }
}
