//! Media source abstraction.
//!
//! The export pipeline only needs four things from a media server: a
//! liveness check, the playlist catalog, a playlist's track listing, and
//! byte transfer for one track.

pub mod plex;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::types::{PlaylistSummary, TrackDescriptor};

pub use plex::PlexClient;

/// A server that owns playlists and their media files.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Name of the source (for logging).
    fn name(&self) -> &'static str;

    /// Checks that the server is reachable and accepts our credentials.
    async fn ping(&self) -> Result<()>;

    /// Lists the playlists available for export.
    async fn list_playlists(&self) -> Result<Vec<PlaylistSummary>>;

    /// Lists a playlist's tracks in server order.
    async fn list_tracks(&self, playlist_id: &str) -> Result<Vec<TrackDescriptor>>;

    /// Downloads one track into `dest_dir` under its `file_name`.
    ///
    /// Returns the path of the finished file. Must not leave a file at that
    /// path if the transfer fails.
    async fn download_track(&self, track: &TrackDescriptor, dest_dir: &Path) -> Result<PathBuf>;
}
