//! In-memory media source and transcoder for tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::{ErrorCode, ExportError, Result};
use crate::fetch::paths::compressed_path;
use crate::source::MediaSource;
use crate::transcode::Transcoder;
use crate::types::{PlaylistSummary, TrackDescriptor};

/// Builds a descriptor for a 3 minute track stored as `file_name`.
pub fn descriptor(title: &str, file_name: &str) -> TrackDescriptor {
    TrackDescriptor::new(
        title,
        Some(180_000),
        format!("/library/parts/{}", file_name),
        &format!("/music/{}", file_name),
    )
}

/// Builds a catalog entry.
pub fn summary(id: &str, title: &str) -> PlaylistSummary {
    PlaylistSummary {
        id: id.to_string(),
        title: title.to_string(),
        track_count: None,
    }
}

#[derive(Default)]
pub struct FakeSource {
    playlists: Vec<(PlaylistSummary, Vec<TrackDescriptor>)>,
    failing: HashSet<String>,
    hanging: HashSet<String>,
    panicking: HashSet<String>,
    flaky: Mutex<HashMap<String, usize>>,
    failing_playlists: HashSet<String>,
    listing_fails: bool,
    catalog_fails: bool,
    ping_fails: bool,
    staggered: bool,
    downloads: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source with a single playlist `"1"` holding `tracks`.
    pub fn with_tracks(tracks: Vec<TrackDescriptor>) -> Self {
        Self::new().with_playlist(summary("1", "Playlist"), tracks)
    }

    pub fn with_playlist(mut self, playlist: PlaylistSummary, tracks: Vec<TrackDescriptor>) -> Self {
        self.playlists.push((playlist, tracks));
        self
    }

    /// Downloads of these file names always fail.
    pub fn failing(mut self, files: &[&str]) -> Self {
        self.failing.extend(files.iter().map(|f| f.to_string()));
        self
    }

    /// Downloads of these file names fail `times` times, then succeed.
    pub fn flaky(self, files: &[&str], times: usize) -> Self {
        {
            let mut flaky = self.flaky.lock().unwrap();
            for file in files {
                flaky.insert(file.to_string(), times);
            }
        }
        self
    }

    /// Downloads of these file names never finish.
    pub fn hanging(mut self, files: &[&str]) -> Self {
        self.hanging.extend(files.iter().map(|f| f.to_string()));
        self
    }

    /// Downloads of these file names panic.
    pub fn panicking(mut self, files: &[&str]) -> Self {
        self.panicking.extend(files.iter().map(|f| f.to_string()));
        self
    }

    pub fn failing_playlist(mut self, id: &str) -> Self {
        self.failing_playlists.insert(id.to_string());
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.listing_fails = true;
        self
    }

    pub fn failing_catalog(mut self) -> Self {
        self.catalog_fails = true;
        self
    }

    pub fn failing_ping(mut self) -> Self {
        self.ping_fails = true;
        self
    }

    /// Earlier listing positions take longer to download.
    pub fn with_staggered_delay(mut self) -> Self {
        self.staggered = true;
        self
    }

    /// Number of download attempts so far.
    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous downloads observed.
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn delay_for(&self, track: &TrackDescriptor) -> Duration {
        if !self.staggered {
            return Duration::ZERO;
        }
        let position = self
            .playlists
            .iter()
            .flat_map(|(_, tracks)| tracks.iter().enumerate())
            .find(|(_, t)| t.file_name == track.file_name)
            .map(|(i, _)| i)
            .unwrap_or(0);
        Duration::from_millis(20 * (10u64.saturating_sub(position as u64)))
    }

    fn should_fail(&self, file_name: &str) -> bool {
        if self.failing.contains(file_name) {
            return true;
        }
        let mut flaky = self.flaky.lock().unwrap();
        match flaky.get_mut(file_name) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl MediaSource for FakeSource {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn ping(&self) -> Result<()> {
        if self.ping_fails {
            return Err(ExportError::new(ErrorCode::ServerUnreachable, "fake ping failure"));
        }
        Ok(())
    }

    async fn list_playlists(&self) -> Result<Vec<PlaylistSummary>> {
        if self.catalog_fails {
            return Err(ExportError::new(ErrorCode::CatalogFetchFailed, "fake catalog failure"));
        }
        Ok(self.playlists.iter().map(|(p, _)| p.clone()).collect())
    }

    async fn list_tracks(&self, playlist_id: &str) -> Result<Vec<TrackDescriptor>> {
        if self.listing_fails || self.failing_playlists.contains(playlist_id) {
            return Err(ExportError::new(
                ErrorCode::PlaylistFetchFailed,
                format!("fake listing failure for {}", playlist_id),
            ));
        }
        self.playlists
            .iter()
            .find(|(p, _)| p.id == playlist_id)
            .map(|(_, tracks)| tracks.clone())
            .ok_or_else(|| {
                ExportError::new(
                    ErrorCode::PlaylistFetchFailed,
                    format!("no playlist {}", playlist_id),
                )
            })
    }

    async fn download_track(&self, track: &TrackDescriptor, dest_dir: &Path) -> Result<PathBuf> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let result = async {
            if self.panicking.contains(&track.file_name) {
                panic!("fake download panic for {}", track.file_name);
            }
            if self.hanging.contains(&track.file_name) {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            tokio::time::sleep(self.delay_for(track)).await;

            if self.should_fail(&track.file_name) {
                return Err(ExportError::new(
                    ErrorCode::DownloadFailed,
                    format!("fake download failure for {}", track.file_name),
                ));
            }

            let dest = dest_dir.join(&track.file_name);
            tokio::fs::write(&dest, format!("audio:{}", track.title))
                .await
                .map_err(|e| ExportError::filesystem("write", &dest, e))?;
            Ok(dest)
        }
        .await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[derive(Default)]
pub struct FakeTranscoder {
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl FakeTranscoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inputs with these file names fail to convert.
    pub fn failing(mut self, files: &[&str]) -> Self {
        self.failing.extend(files.iter().map(|f| f.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn transcode(&self, input: &Path, bitrate: &str) -> Result<PathBuf> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let file_name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.failing.contains(&file_name) {
            return Err(ExportError::new(
                ErrorCode::TranscodeFailed,
                format!("fake transcode failure for {}", file_name),
            ));
        }

        let output = compressed_path(input);
        tokio::fs::write(&output, format!("mp3@{}", bitrate))
            .await
            .map_err(|e| ExportError::filesystem("write", &output, e))?;
        Ok(output)
    }
}
