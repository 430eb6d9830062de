//! Concurrent download and conversion of one playlist's tracks.
//!
//! Each track runs as its own task inside a [`JoinSet`], bounded by a
//! semaphore. Tasks return their outcome instead of writing to shared state;
//! a single aggregation step after the join builds the [`FetchReport`].

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::FetchOptions;
use crate::error::{ErrorCode, ExportError, Result};
use crate::source::MediaSource;
use crate::transcode::Transcoder;
use crate::types::{Track, TrackDescriptor};

use super::paths::{expected_final_path, find_existing, is_lossless};

/// Delay before the first download retry; doubles on each further attempt.
pub const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// A track that could not be exported.
#[derive(Debug)]
pub struct TrackFailure {
    /// Display title of the failed track.
    pub title: String,
    /// What went wrong.
    pub error: ExportError,
}

/// Result of one playlist's fetch.
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Finalized tracks in source listing order.
    pub tracks: Vec<Track>,
    /// Tracks downloaded during this call.
    pub downloaded: usize,
    /// Tracks whose finished file was already on disk.
    pub skipped: usize,
    /// Tracks excluded from `tracks`.
    pub failures: Vec<TrackFailure>,
}

/// How a single track ended.
#[derive(Debug)]
enum TrackOutcome {
    Downloaded(Track),
    Skipped(Track),
    Failed(ExportError),
}

/// Orchestrates per-track download, dedup, and conditional transcode.
pub struct FetchCoordinator {
    source: Arc<dyn MediaSource>,
    transcoder: Arc<dyn Transcoder>,
    options: FetchOptions,
}

impl FetchCoordinator {
    /// Creates a coordinator over the given collaborators.
    pub fn new(
        source: Arc<dyn MediaSource>,
        transcoder: Arc<dyn Transcoder>,
        options: FetchOptions,
    ) -> Self {
        Self {
            source,
            transcoder,
            options,
        }
    }

    /// Lists `playlist_id` and fetches every track into `out_dir`.
    ///
    /// Fails only if the listing itself fails. Per-track problems are
    /// reported in [`FetchReport::failures`].
    pub async fn fetch_and_convert(&self, playlist_id: &str, out_dir: &Path) -> Result<FetchReport> {
        let descriptors = self.source.list_tracks(playlist_id).await?;
        log::info!(
            "Playlist {} lists {} tracks",
            playlist_id,
            descriptors.len()
        );
        Ok(self.fetch_descriptors(descriptors, out_dir).await)
    }

    /// Fetches already-listed tracks into `out_dir`.
    pub async fn fetch_descriptors(
        &self,
        descriptors: Vec<TrackDescriptor>,
        out_dir: &Path,
    ) -> FetchReport {
        let entries = unique_destinations(descriptors, out_dir);
        let limit = self.options.effective_concurrency(entries.len());
        let semaphore = Arc::new(Semaphore::new(limit));
        let worker = Arc::new(TrackWorker {
            source: Arc::clone(&self.source),
            transcoder: Arc::clone(&self.transcoder),
            out_dir: out_dir.to_path_buf(),
            options: self.options.clone(),
        });

        // Titles of tasks that have not reported back yet.
        let mut pending: BTreeMap<usize, String> = BTreeMap::new();
        let mut tasks = JoinSet::new();
        for (index, descriptor) in entries {
            pending.insert(index, descriptor.title.clone());
            let worker = Arc::clone(&worker);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let outcome = worker.run(&descriptor).await;
                (index, outcome)
            });
        }

        let mut finished = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => {
                    if let Some(title) = pending.remove(&index) {
                        finished.push((index, title, outcome));
                    }
                }
                Err(e) => log::error!("Track task aborted: {}", e),
            }
        }

        // Whatever is still pending panicked or was cancelled.
        for (index, title) in pending {
            let error = ExportError::new(
                ErrorCode::DownloadFailed,
                format!("Track task for \"{}\" panicked or was cancelled", title),
            );
            finished.push((index, title, TrackOutcome::Failed(error)));
        }

        let mut report = FetchReport::default();
        finished.sort_by_key(|(index, _, _)| *index);
        for (_, title, outcome) in finished {
            match outcome {
                TrackOutcome::Downloaded(track) => {
                    report.downloaded += 1;
                    report.tracks.push(track);
                }
                TrackOutcome::Skipped(track) => {
                    report.skipped += 1;
                    report.tracks.push(track);
                }
                TrackOutcome::Failed(error) => {
                    log::error!("Track \"{}\" failed: {}", title, error);
                    report.failures.push(TrackFailure { title, error });
                }
            }
        }

        report
    }
}

/// Drops entries whose finished file would collide with an earlier entry.
///
/// Keeps the original listing index of each survivor for ordering.
fn unique_destinations(
    descriptors: Vec<TrackDescriptor>,
    out_dir: &Path,
) -> Vec<(usize, TrackDescriptor)> {
    let mut seen = HashSet::new();
    descriptors
        .into_iter()
        .enumerate()
        .filter(|(_, descriptor)| {
            let fresh = seen.insert(expected_final_path(descriptor, out_dir));
            if !fresh {
                log::warn!(
                    "Duplicate playlist entry \"{}\" ({}), keeping the first",
                    descriptor.title,
                    descriptor.file_name
                );
            }
            fresh
        })
        .collect()
}

/// Everything one track task needs, shared across tasks.
struct TrackWorker {
    source: Arc<dyn MediaSource>,
    transcoder: Arc<dyn Transcoder>,
    out_dir: PathBuf,
    options: FetchOptions,
}

impl TrackWorker {
    async fn run(&self, descriptor: &TrackDescriptor) -> TrackOutcome {
        match tokio::time::timeout(self.options.track_timeout(), self.process(descriptor)).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => TrackOutcome::Failed(e),
            Err(_) => TrackOutcome::Failed(ExportError::track_timeout(
                &descriptor.title,
                self.options.track_timeout_secs,
            )),
        }
    }

    async fn process(&self, descriptor: &TrackDescriptor) -> Result<TrackOutcome> {
        if let Some(existing) = find_existing(descriptor, &self.out_dir, |p| p.is_file()) {
            log::info!(
                "Track already exists, skipping: \"{}\" ({})",
                descriptor.title,
                existing.display()
            );
            return Ok(TrackOutcome::Skipped(Track::from_descriptor(
                descriptor, existing,
            )));
        }

        log::info!("Downloading track: \"{}\"", descriptor.title);
        let downloaded = self.download_with_retry(descriptor).await?;
        log::info!(
            "Downloaded track: \"{}\" -> {}",
            descriptor.title,
            downloaded.display()
        );

        let final_path = if is_lossless(&downloaded) {
            self.convert(&downloaded).await?
        } else {
            downloaded
        };

        Ok(TrackOutcome::Downloaded(Track::from_descriptor(
            descriptor, final_path,
        )))
    }

    async fn download_with_retry(&self, descriptor: &TrackDescriptor) -> Result<PathBuf> {
        let mut attempt: u32 = 0;
        loop {
            match self.source.download_track(descriptor, &self.out_dir).await {
                Ok(path) => return Ok(path),
                Err(e)
                    if e.code == ErrorCode::DownloadFailed
                        && attempt < self.options.download_retries =>
                {
                    let delay = RETRY_BASE_DELAY * 2u32.pow(attempt);
                    attempt += 1;
                    log::warn!(
                        "Download of \"{}\" failed (attempt {}/{}), retrying in {:?}: {}",
                        descriptor.title,
                        attempt,
                        self.options.download_retries + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Transcodes a lossless download and removes the original.
    ///
    /// On failure the lossless file is left in place.
    async fn convert(&self, lossless: &Path) -> Result<PathBuf> {
        log::info!(
            "Converting {} with {} at {}",
            lossless.display(),
            self.transcoder.name(),
            self.options.bitrate
        );
        let compressed = self
            .transcoder
            .transcode(lossless, &self.options.bitrate)
            .await?;

        if let Err(e) = tokio::fs::remove_file(lossless).await {
            // The cleanup pass catches whatever is left.
            log::warn!("Failed to remove {}: {}", lossless.display(), e);
        }

        log::info!(
            "Converted: {} -> {}",
            lossless.display(),
            compressed.display()
        );
        Ok(compressed)
    }
}
