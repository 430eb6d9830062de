//! ffmpeg-backed transcoder.
//!
//! Output is written to a `.part` file and renamed once ffmpeg exits
//! cleanly, so a killed conversion never looks finished.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{ErrorCode, ExportError, Result};
use crate::fetch::paths::{compressed_path, partial_path};

use super::Transcoder;

/// Runs the `ffmpeg` binary as a child process.
pub struct FfmpegTranscoder {
    binary_path: PathBuf,
}

impl FfmpegTranscoder {
    /// Creates a transcoder that invokes `binary_path`.
    pub fn new(binary_path: impl Into<PathBuf>) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    /// Returns the argument list for one conversion.
    fn args(input: &Path, output: &Path, bitrate: &str) -> Vec<std::ffi::OsString> {
        let mut args: Vec<std::ffi::OsString> = Vec::with_capacity(15);
        for arg in ["-nostdin", "-y", "-loglevel", "error", "-i"] {
            args.push(arg.into());
        }
        args.push(input.into());
        for arg in [
            "-ab",
            bitrate,
            "-map_metadata",
            "0",
            "-id3v2_version",
            "3",
            "-f",
            "mp3",
        ] {
            args.push(arg.into());
        }
        args.push(output.into());
        args
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    async fn transcode(&self, input: &Path, bitrate: &str) -> Result<PathBuf> {
        let output = compressed_path(input);
        let partial = partial_path(&output);

        let result = Command::new(&self.binary_path)
            .args(Self::args(input, &partial, bitrate))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                ExportError::with_source(
                    ErrorCode::TranscodeFailed,
                    format!("Failed to start {}", self.binary_path.display()),
                    e,
                )
            })?;

        if !result.status.success() {
            let _ = tokio::fs::remove_file(&partial).await;
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(ExportError::new(
                ErrorCode::TranscodeFailed,
                format!(
                    "Converting {} exited with {}: {}",
                    input.display(),
                    result.status,
                    stderr.trim()
                ),
            ));
        }

        tokio::fs::rename(&partial, &output)
            .await
            .map_err(|e| ExportError::filesystem("rename", &partial, e))?;
        Ok(output)
    }
}
