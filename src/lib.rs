//! plex-playlist-export: export Plex audio playlists as local files.
//!
//! For each selected playlist the tracks are downloaded with bounded
//! concurrency, lossless files are transcoded to MP3, and an M3U manifest
//! is written next to them.
//!
//! # Modules
//!
//! - [`types`]: Core data types (TrackDescriptor, Track, PlaylistSummary)
//! - [`config`]: Runtime configuration (ExportConfig, FetchOptions)
//! - [`error`]: Error types and codes (ExportError, ErrorCode)
//! - [`source`]: Media server access (MediaSource, PlexClient)
//! - [`transcode`]: Lossless conversion (Transcoder, FfmpegTranscoder)
//! - [`fetch`]: Concurrent per-playlist download pipeline
//! - [`playlist`]: M3U manifest output
//! - [`export`]: Selection, orchestration and cleanup
//!
//! # Example
//!
//! ```rust,ignore
//! use plex_playlist_export::{config::ExportConfig, export::{run_export, AllPlaylists}};
//!
//! let config = ExportConfig::from_env()?;
//! let summary = run_export(&config, "exports".as_ref(), &mut AllPlaylists).await?;
//! println!("{} playlists exported", summary.playlists_exported);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod playlist;
pub mod source;
pub mod transcode;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types at crate root for convenience
pub use config::{ExportConfig, FetchOptions};
pub use error::{ErrorCode, ExportError, Result};
pub use types::{PlaylistSummary, Track, TrackDescriptor};
