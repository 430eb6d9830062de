//! Core types for playlist export.
//!
//! - [`TrackDescriptor`]: a playlist entry as listed by the media source
//! - [`Track`]: a finalized local file ready for a manifest
//! - [`PlaylistSummary`]: one entry of the playlist catalog
//! - [`PlaylistExportJob`]: one playlist's export in progress

mod playlist;
mod track;

pub use playlist::{PlaylistExportJob, PlaylistSummary};
pub use track::{base_name, Track, TrackDescriptor, UNKNOWN_DURATION};
