//! Track types.
//!
//! A [`TrackDescriptor`] is what the media source lists for a playlist entry
//! before anything is downloaded. A [`Track`] is the finalized, playable file
//! on local disk that ends up in a manifest.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Duration written for tracks whose length the server did not report.
///
/// `-1` is the conventional "unknown" value for `#EXTINF`.
pub const UNKNOWN_DURATION: i64 = -1;

/// Listing-level record for one playlist entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDescriptor {
    /// Display title.
    pub title: String,

    /// Source-reported length in milliseconds, if known.
    pub duration_ms: Option<u64>,

    /// Opaque reference the source uses to transfer the file's bytes.
    pub remote_ref: String,

    /// Base name of the file on the server, e.g. `Song Title.flac`.
    pub file_name: String,
}

impl TrackDescriptor {
    /// Creates a descriptor, reducing `server_path` to its base name.
    pub fn new(
        title: impl Into<String>,
        duration_ms: Option<u64>,
        remote_ref: impl Into<String>,
        server_path: &str,
    ) -> Self {
        Self {
            title: title.into(),
            duration_ms,
            remote_ref: remote_ref.into(),
            file_name: base_name(server_path).to_string(),
        }
    }

    /// Length in whole seconds, rounded, or [`UNKNOWN_DURATION`].
    pub fn duration_secs(&self) -> i64 {
        match self.duration_ms {
            Some(ms) => ((ms + 500) / 1000) as i64,
            None => UNKNOWN_DURATION,
        }
    }
}

/// A finalized track: its backing file exists at `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Display title written after the `#EXTINF` duration.
    pub title: String,

    /// Absolute path to the playable file.
    pub path: PathBuf,

    /// Length in seconds, or [`UNKNOWN_DURATION`].
    pub duration: i64,
}

impl Track {
    /// Finalizes a descriptor against the file that now backs it.
    pub fn from_descriptor(descriptor: &TrackDescriptor, path: PathBuf) -> Self {
        Self {
            title: descriptor.title.clone(),
            path,
            duration: descriptor.duration_secs(),
        }
    }
}

/// Returns the last component of a server-side path.
///
/// Servers may run on Windows, so both separators are honored regardless of
/// the local platform.
pub fn base_name(server_path: &str) -> &str {
    server_path
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(server_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_name_unix_path() {
        assert_eq!(base_name("/music/Artist/Album/01 Song.flac"), "01 Song.flac");
    }

    #[test]
    fn base_name_windows_path() {
        assert_eq!(base_name(r"D:\Music\Artist\02 Song.mp3"), "02 Song.mp3");
    }

    #[test]
    fn base_name_bare_file() {
        assert_eq!(base_name("Song.flac"), "Song.flac");
    }

    #[test]
    fn duration_rounds_to_seconds() {
        let d = TrackDescriptor::new("A", Some(180_499), "/k", "/a.flac");
        assert_eq!(d.duration_secs(), 180);
        let d = TrackDescriptor::new("A", Some(180_500), "/k", "/a.flac");
        assert_eq!(d.duration_secs(), 181);
    }

    #[test]
    fn unknown_duration() {
        let d = TrackDescriptor::new("A", None, "/k", "/a.flac");
        assert_eq!(d.duration_secs(), UNKNOWN_DURATION);
    }

    #[test]
    fn track_from_descriptor() {
        let d = TrackDescriptor::new("Song", Some(200_000), "/library/parts/1/file.flac", "/m/Song.flac");
        let track = Track::from_descriptor(&d, PathBuf::from("/out/Song.mp3"));
        assert_eq!(track.title, "Song");
        assert_eq!(track.duration, 200);
        assert_eq!(track.path, PathBuf::from("/out/Song.mp3"));
    }
}
