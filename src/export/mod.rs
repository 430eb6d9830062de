//! Export orchestration.
//!
//! - [`select`]: choosing which playlists to export
//! - [`orchestrator`]: the per-run sequence across playlists
//! - [`cleanup`]: the final sweep of intermediate files

pub mod cleanup;
pub mod orchestrator;
pub mod select;

use std::path::Path;
use std::sync::Arc;

use crate::config::ExportConfig;
use crate::error::{ErrorCode, ExportError, Result};
use crate::source::PlexClient;
use crate::transcode::FfmpegTranscoder;

pub use cleanup::{remove_intermediate_files, CleanupReport};
pub use orchestrator::{playlist_dir_name, ExportOrchestrator, ExportSummary};
pub use select::{parse_selection, stdin_prompt, AllPlaylists, ByTitle, PlaylistSelector, PromptSelector};

/// Exports from the configured Plex server into `out_dir` using ffmpeg.
pub async fn run_export(
    config: &ExportConfig,
    out_dir: &Path,
    selector: &mut dyn PlaylistSelector,
) -> Result<ExportSummary> {
    if let Some(message) = config.validate() {
        return Err(ExportError::new(ErrorCode::ConfigInvalid, message));
    }

    let source = PlexClient::new(&config.server_url, &config.token)?;
    let transcoder = FfmpegTranscoder::new(config.ffmpeg_path.clone());

    log::info!(
        "Exporting from {} with up to {} concurrent tracks",
        config.server_url,
        config.fetch.concurrency
    );

    let orchestrator =
        ExportOrchestrator::new(Arc::new(source), Arc::new(transcoder), config.fetch.clone());
    orchestrator.export(out_dir, selector).await
}
