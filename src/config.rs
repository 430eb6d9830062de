//! Export configuration.
//!
//! Server credentials come from the environment. Tuning knobs have
//! environment defaults that command-line flags can override.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ExportError, Result};

/// Environment variable holding the server base URL.
pub const ENV_URL: &str = "PLEX_URL";
/// Environment variable holding the access token.
pub const ENV_TOKEN: &str = "PLEX_TOKEN";
/// Environment variable for the track concurrency limit.
pub const ENV_CONCURRENCY: &str = "PLEX_EXPORT_CONCURRENCY";
/// Environment variable for the per-track timeout in seconds.
pub const ENV_TRACK_TIMEOUT: &str = "PLEX_EXPORT_TRACK_TIMEOUT";
/// Environment variable for the download retry count.
pub const ENV_RETRIES: &str = "PLEX_EXPORT_RETRIES";
/// Environment variable for the ffmpeg binary.
pub const ENV_FFMPEG: &str = "PLEX_EXPORT_FFMPEG";

/// Default number of tracks processed at once.
pub const DEFAULT_CONCURRENCY: usize = 8;
/// Default per-track timeout (15 minutes).
pub const DEFAULT_TRACK_TIMEOUT_SECS: u64 = 900;
/// Default number of download retries after the first attempt.
pub const DEFAULT_DOWNLOAD_RETRIES: u32 = 2;
/// Upper bound accepted for download retries.
pub const MAX_DOWNLOAD_RETRIES: u32 = 10;
/// Target bitrate for lossless transcodes.
pub const TARGET_BITRATE: &str = "320k";

/// Runtime configuration for an export run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Media server base URL, e.g. `http://192.168.1.10:32400`.
    pub server_url: String,

    /// Access token sent as `X-Plex-Token`.
    pub token: String,

    /// Pipeline tuning shared with the fetch coordinator.
    pub fetch: FetchOptions,

    /// ffmpeg binary name or path.
    pub ffmpeg_path: PathBuf,
}

/// Tuning for the per-playlist download pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchOptions {
    /// Maximum tracks in flight. `0` means one task per track with no bound.
    pub concurrency: usize,

    /// Upper bound on one track's download plus transcode.
    pub track_timeout_secs: u64,

    /// Download retries after the first failed attempt.
    pub download_retries: u32,

    /// Bitrate handed to the transcoder.
    pub bitrate: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            track_timeout_secs: DEFAULT_TRACK_TIMEOUT_SECS,
            download_retries: DEFAULT_DOWNLOAD_RETRIES,
            bitrate: TARGET_BITRATE.to_string(),
        }
    }
}

impl FetchOptions {
    /// Returns the per-track timeout as a Duration.
    pub fn track_timeout(&self) -> Duration {
        Duration::from_secs(self.track_timeout_secs)
    }

    /// Resolves the concurrency limit for `track_count` tracks.
    ///
    /// Never more than one permit per track, so oversized settings stay
    /// within what a semaphore accepts.
    pub fn effective_concurrency(&self, track_count: usize) -> usize {
        let per_track = track_count.max(1);
        if self.concurrency == 0 {
            per_track
        } else {
            self.concurrency.min(per_track)
        }
    }
}

impl ExportConfig {
    /// Creates a configuration with default tuning.
    pub fn new(server_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            token: token.into(),
            fetch: FetchOptions::default(),
            ffmpeg_path: PathBuf::from("ffmpeg"),
        }
    }

    /// Creates an ExportConfig from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `PLEX_URL` - Server base URL (required)
    /// - `PLEX_TOKEN` - Access token (required)
    /// - `PLEX_EXPORT_CONCURRENCY` - Max tracks in flight, 0 for unbounded
    /// - `PLEX_EXPORT_TRACK_TIMEOUT` - Per-track timeout in seconds
    /// - `PLEX_EXPORT_RETRIES` - Download retries (0-10)
    /// - `PLEX_EXPORT_FFMPEG` - ffmpeg binary
    ///
    /// Invalid optional values are ignored and keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(ENV_URL).filter(|v| !v.trim().is_empty());
        let token = lookup(ENV_TOKEN).filter(|v| !v.trim().is_empty());

        let (server_url, token) = match (url, token) {
            (Some(url), Some(token)) => (url, token),
            (None, Some(_)) => return Err(ExportError::config_missing(&[ENV_URL])),
            (Some(_), None) => return Err(ExportError::config_missing(&[ENV_TOKEN])),
            (None, None) => return Err(ExportError::config_missing(&[ENV_URL, ENV_TOKEN])),
        };

        let mut config = Self::new(server_url.trim_end_matches('/'), token);

        if let Some(value) = lookup(ENV_CONCURRENCY) {
            if let Ok(concurrency) = value.trim().parse::<usize>() {
                config.fetch.concurrency = concurrency;
            }
        }

        if let Some(value) = lookup(ENV_TRACK_TIMEOUT) {
            if let Ok(secs) = value.trim().parse::<u64>() {
                if secs > 0 {
                    config.fetch.track_timeout_secs = secs;
                }
            }
        }

        if let Some(value) = lookup(ENV_RETRIES) {
            if let Ok(retries) = value.trim().parse::<u32>() {
                if retries <= MAX_DOWNLOAD_RETRIES {
                    config.fetch.download_retries = retries;
                }
            }
        }

        if let Some(path) = lookup(ENV_FFMPEG) {
            if !path.trim().is_empty() {
                config.ffmpeg_path = PathBuf::from(path);
            }
        }

        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails, None otherwise.
    pub fn validate(&self) -> Option<String> {
        if !(self.server_url.starts_with("http://") || self.server_url.starts_with("https://")) {
            return Some(format!(
                "server URL must start with http:// or https://, got {}",
                self.server_url
            ));
        }

        if self.fetch.track_timeout_secs == 0 {
            return Some("track timeout must be > 0".to_string());
        }

        if self.fetch.download_retries > MAX_DOWNLOAD_RETRIES {
            return Some(format!(
                "retries too high: {} (max {})",
                self.fetch.download_retries, MAX_DOWNLOAD_RETRIES
            ));
        }

        None
    }
}
