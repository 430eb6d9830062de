//! Lossless to compressed audio conversion.

pub mod ffmpeg;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub use ffmpeg::FfmpegTranscoder;

/// Converts a lossless file into its compressed sibling.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Name of the transcoder (for logging).
    fn name(&self) -> &'static str;

    /// Encodes `input` at `bitrate` and returns the output path.
    ///
    /// The output lives next to the input with the compressed extension
    /// (see [`crate::fetch::paths::compressed_path`]). The input is left in
    /// place; removing it is the caller's decision.
    async fn transcode(&self, input: &Path, bitrate: &str) -> Result<PathBuf>;
}
