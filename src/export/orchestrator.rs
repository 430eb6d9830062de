//! End-to-end export across selected playlists.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::FetchOptions;
use crate::error::{ErrorCode, ExportError, Result};
use crate::fetch::{FetchCoordinator, FetchReport};
use crate::source::MediaSource;
use crate::transcode::Transcoder;
use crate::types::{PlaylistExportJob, PlaylistSummary};

use super::cleanup::remove_intermediate_files;
use super::select::PlaylistSelector;

/// Totals for one export run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Playlists whose manifest was written.
    pub playlists_exported: usize,
    /// Playlists that failed to list or write.
    pub playlists_failed: usize,
    /// Tracks referenced by written manifests.
    pub tracks_written: usize,
    /// Tracks downloaded during this run.
    pub tracks_downloaded: usize,
    /// Tracks already on disk from an earlier run.
    pub tracks_skipped: usize,
    /// Tracks left out of their manifest.
    pub tracks_failed: usize,
    /// Lossless files removed by the cleanup pass.
    pub lossless_removed: usize,
    /// Manifests written, in export order.
    pub manifests: Vec<PathBuf>,
}

/// Drives the export: liveness, catalog, selection, per-playlist fetch and
/// manifest, then cleanup.
pub struct ExportOrchestrator {
    source: Arc<dyn MediaSource>,
    coordinator: FetchCoordinator,
}

impl ExportOrchestrator {
    pub fn new(
        source: Arc<dyn MediaSource>,
        transcoder: Arc<dyn Transcoder>,
        options: FetchOptions,
    ) -> Self {
        let coordinator = FetchCoordinator::new(Arc::clone(&source), transcoder, options);
        Self {
            source,
            coordinator,
        }
    }

    /// Exports the playlists chosen by `selector` into `out_dir`.
    ///
    /// Only run-level failures are returned. A playlist that fails is logged
    /// and counted, and the run moves on to the next one.
    pub async fn export(
        &self,
        out_dir: &Path,
        selector: &mut dyn PlaylistSelector,
    ) -> Result<ExportSummary> {
        self.source.ping().await?;
        log::debug!("Connected to {} server", self.source.name());

        log::debug!("Creating output directory: {}", out_dir.display());
        fs::create_dir_all(out_dir).map_err(|e| ExportError::filesystem("create", out_dir, e))?;
        let out_dir = fs::canonicalize(out_dir)
            .map_err(|e| ExportError::filesystem("resolve", out_dir, e))?;

        let catalog = self.source.list_playlists().await?;
        if catalog.is_empty() {
            log::warn!("The server has no audio playlists");
        }

        let selected = selector.select(&catalog)?;
        log::info!("Selected {} of {} playlists", selected.len(), catalog.len());

        let mut summary = ExportSummary::default();
        for playlist in &selected {
            log::info!(
                "Exporting playlist \"{}\" (id {})",
                playlist.title,
                playlist.id
            );
            match self.export_playlist(playlist, &out_dir).await {
                Ok((report, manifest)) => {
                    summary.playlists_exported += 1;
                    summary.tracks_written += report.tracks.len();
                    summary.tracks_downloaded += report.downloaded;
                    summary.tracks_skipped += report.skipped;
                    summary.tracks_failed += report.failures.len();
                    summary.manifests.push(manifest);
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    summary.playlists_failed += 1;
                    log::error!("Error exporting playlist \"{}\": {}", playlist.title, e);
                }
            }
        }

        let cleanup = remove_intermediate_files(&out_dir)?;
        summary.lossless_removed = cleanup.lossless_removed;

        log::info!(
            "Export completed: {} playlists ({} failed), {} tracks ({} downloaded, {} already present, {} failed) in {}",
            summary.playlists_exported,
            summary.playlists_failed,
            summary.tracks_written,
            summary.tracks_downloaded,
            summary.tracks_skipped,
            summary.tracks_failed,
            out_dir.display()
        );
        Ok(summary)
    }

    async fn export_playlist(
        &self,
        playlist: &PlaylistSummary,
        base_dir: &Path,
    ) -> Result<(FetchReport, PathBuf)> {
        let dir = base_dir.join(playlist_dir_name(playlist));
        fs::create_dir_all(&dir).map_err(|e| {
            ExportError::with_source(
                ErrorCode::ManifestWriteFailed,
                format!("Failed to create playlist directory {}", dir.display()),
                e,
            )
        })?;

        let report = self.coordinator.fetch_and_convert(&playlist.id, &dir).await?;

        let mut job = PlaylistExportJob::new(playlist);
        job.tracks = report.tracks.clone();
        let manifest = job.write_manifest(&dir)?;

        log::info!(
            "Playlist \"{}\": {} tracks written, {} failed",
            playlist.title,
            report.tracks.len(),
            report.failures.len()
        );
        Ok((report, manifest))
    }
}

/// Directory name for a playlist's files.
///
/// The title is used as-is except for path separators, and titles that
/// would not name a child directory fall back to the playlist id.
pub fn playlist_dir_name(playlist: &PlaylistSummary) -> String {
    let name = playlist.title.replace(['/', '\\'], "_");
    match name.trim() {
        "" | "." | ".." => format!("playlist-{}", playlist.id),
        _ => name,
    }
}
