//! Error types for playlist export.
//!
//! Defines the error codes and the error type used across the crate so that
//! run-level failures can be told apart from track- and playlist-level ones.

use std::fmt;

/// Error codes attached to every [`ExportError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A required environment value is missing or empty.
    /// Trigger: `PLEX_URL` or `PLEX_TOKEN` unset.
    ConfigMissing,

    /// A configuration value is present but unusable.
    /// Trigger: non-http(s) server URL, zero timeout, too many retries.
    ConfigInvalid,

    /// The media server client could not be constructed.
    /// Trigger: malformed server URL, TLS backend failure.
    ClientInitFailed,

    /// The media server did not answer the liveness check.
    /// Trigger: server down, wrong URL, rejected token.
    ServerUnreachable,

    /// The playlist catalog could not be fetched.
    CatalogFetchFailed,

    /// The track listing of one playlist could not be fetched.
    PlaylistFetchFailed,

    /// Playlist selection failed or was given invalid input.
    SelectionFailed,

    /// A single track could not be downloaded.
    DownloadFailed,

    /// A single track could not be transcoded.
    TranscodeFailed,

    /// A single track did not finish within the per-track timeout.
    TrackTimeout,

    /// The playlist manifest could not be written.
    ManifestWriteFailed,

    /// A filesystem operation on the output tree failed.
    FilesystemError,

    /// The run was cancelled by the user.
    Interrupted,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigMissing => "CONFIG_MISSING",
            ErrorCode::ConfigInvalid => "CONFIG_INVALID",
            ErrorCode::ClientInitFailed => "CLIENT_INIT_FAILED",
            ErrorCode::ServerUnreachable => "SERVER_UNREACHABLE",
            ErrorCode::CatalogFetchFailed => "CATALOG_FETCH_FAILED",
            ErrorCode::PlaylistFetchFailed => "PLAYLIST_FETCH_FAILED",
            ErrorCode::SelectionFailed => "SELECTION_FAILED",
            ErrorCode::DownloadFailed => "DOWNLOAD_FAILED",
            ErrorCode::TranscodeFailed => "TRANSCODE_FAILED",
            ErrorCode::TrackTimeout => "TRACK_TIMEOUT",
            ErrorCode::ManifestWriteFailed => "MANIFEST_WRITE_FAILED",
            ErrorCode::FilesystemError => "FILESYSTEM_ERROR",
            ErrorCode::Interrupted => "INTERRUPTED",
        }
    }

    /// Returns a recovery hint suggesting how to resolve this error.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCode::ConfigMissing => {
                "Set PLEX_URL (e.g. http://192.168.1.10:32400) and PLEX_TOKEN before running"
            }
            ErrorCode::ConfigInvalid => {
                "Fix the reported value in the environment or on the command line"
            }
            ErrorCode::ClientInitFailed => "Check that PLEX_URL is a valid http(s) URL",
            ErrorCode::ServerUnreachable => {
                "Verify the server is running, reachable from this machine, \
                 and that PLEX_TOKEN is still valid"
            }
            ErrorCode::CatalogFetchFailed | ErrorCode::PlaylistFetchFailed => {
                "Retry the export; if it keeps failing check the server logs"
            }
            ErrorCode::SelectionFailed => {
                "Enter playlist numbers separated by commas, or pass --playlist / --all"
            }
            ErrorCode::DownloadFailed => {
                "Re-run the export; tracks already on disk are skipped"
            }
            ErrorCode::TranscodeFailed => {
                "Check that ffmpeg is installed (or set PLEX_EXPORT_FFMPEG) and the source file is intact"
            }
            ErrorCode::TrackTimeout => {
                "Raise the limit with --track-timeout or PLEX_EXPORT_TRACK_TIMEOUT"
            }
            ErrorCode::ManifestWriteFailed | ErrorCode::FilesystemError => {
                "Check permissions and free space in the output directory"
            }
            ErrorCode::Interrupted => "Re-run the export to resume; finished tracks are kept",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for export operations.
#[derive(Debug)]
pub struct ExportError {
    /// The error code identifying the type of error.
    pub code: ErrorCode,
    /// Human-readable error message with context.
    pub message: String,
    /// Optional underlying cause of the error.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ExportError {
    /// Creates a new ExportError with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new ExportError with an underlying cause.
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a CONFIG_MISSING error naming the absent variables.
    pub fn config_missing(names: &[&str]) -> Self {
        Self::new(
            ErrorCode::ConfigMissing,
            format!("{} must be set", names.join(" and ")),
        )
    }

    /// Creates a FILESYSTEM_ERROR for an operation on `path`.
    pub fn filesystem(
        action: &str,
        path: &std::path::Path,
        source: std::io::Error,
    ) -> Self {
        Self::with_source(
            ErrorCode::FilesystemError,
            format!("Failed to {} {}", action, path.display()),
            source,
        )
    }

    /// Creates a TRACK_TIMEOUT error.
    pub fn track_timeout(title: &str, secs: u64) -> Self {
        Self::new(
            ErrorCode::TrackTimeout,
            format!("Track \"{}\" did not finish within {}s", title, secs),
        )
    }

    /// Creates an INTERRUPTED error.
    pub fn interrupted() -> Self {
        Self::new(ErrorCode::Interrupted, "Export interrupted")
    }

    /// Returns true if this error aborts the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::ConfigMissing
                | ErrorCode::ConfigInvalid
                | ErrorCode::ClientInitFailed
                | ErrorCode::ServerUnreachable
                | ErrorCode::CatalogFetchFailed
                | ErrorCode::SelectionFailed
                | ErrorCode::FilesystemError
                | ErrorCode::Interrupted
        )
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(source) = &self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Result type alias using ExportError.
pub type Result<T> = std::result::Result<T, ExportError>;
