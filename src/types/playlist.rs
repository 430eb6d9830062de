//! Playlist types.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::playlist::write_manifest;

use super::track::Track;

/// One entry of the source's playlist catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSummary {
    /// Opaque identifier used to list the playlist's tracks.
    pub id: String,

    /// Playlist name as shown by the server.
    pub title: String,

    /// Number of entries, when the server reports it.
    pub track_count: Option<u32>,
}

/// One playlist's export, from selection to written manifest.
#[derive(Debug, Clone)]
pub struct PlaylistExportJob {
    /// Source playlist name.
    pub title: String,

    /// Identifier passed to the media source.
    pub source_id: String,

    /// Finalized tracks in manifest order.
    pub tracks: Vec<Track>,
}

impl PlaylistExportJob {
    /// Creates an empty job for a selected playlist.
    pub fn new(playlist: &PlaylistSummary) -> Self {
        Self {
            title: playlist.title.clone(),
            source_id: playlist.id.clone(),
            tracks: Vec::new(),
        }
    }

    /// Writes the manifest into `out_dir`, consuming the job.
    pub fn write_manifest(self, out_dir: &Path) -> Result<PathBuf> {
        write_manifest(&self.tracks, &self.title, out_dir)
    }
}
