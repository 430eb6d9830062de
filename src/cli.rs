//! Command-line arguments.
//!
//! Flags override the matching environment values from
//! [`ExportConfig::from_env`](crate::config::ExportConfig::from_env).

use std::path::PathBuf;

use clap::Parser;

use crate::config::{ExportConfig, MAX_DOWNLOAD_RETRIES};
use crate::export::{stdin_prompt, AllPlaylists, ByTitle, PlaylistSelector};

/// plex-playlist-export: copy Plex audio playlists to local files and M3U manifests
#[derive(Parser, Debug)]
#[command(name = "plex-playlist-export")]
#[command(about = "Export Plex audio playlists as local MP3 files with M3U manifests")]
#[command(version)]
pub struct Cli {
    /// Directory that receives one folder per exported playlist
    #[arg(short, long)]
    pub out_dir: PathBuf,

    /// Export the playlist with this title (repeatable, case-insensitive)
    #[arg(short = 'p', long = "playlist", value_name = "TITLE")]
    pub playlists: Vec<String>,

    /// Export every audio playlist without prompting
    #[arg(long, conflicts_with = "playlists")]
    pub all: bool,

    /// Maximum tracks downloaded or transcoded at once (0 for no limit)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Seconds allowed for one track's download and transcode
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub track_timeout: Option<u64>,

    /// Download retries after a failed attempt
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=MAX_DOWNLOAD_RETRIES as i64))]
    pub retries: Option<u32>,

    /// ffmpeg binary to use for transcoding
    #[arg(long)]
    pub ffmpeg: Option<PathBuf>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Applies flag overrides on top of `config`.
    pub fn apply(&self, config: &mut ExportConfig) {
        if let Some(jobs) = self.jobs {
            config.fetch.concurrency = jobs;
        }
        if let Some(secs) = self.track_timeout {
            config.fetch.track_timeout_secs = secs;
        }
        if let Some(retries) = self.retries {
            config.fetch.download_retries = retries;
        }
        if let Some(ref path) = self.ffmpeg {
            config.ffmpeg_path = path.clone();
        }
    }

    /// Returns the playlist selector implied by the flags.
    ///
    /// Without `--all` or `--playlist` the user is prompted on stdin.
    pub fn selector(&self) -> Box<dyn PlaylistSelector> {
        if self.all {
            Box::new(AllPlaylists)
        } else if !self.playlists.is_empty() {
            Box::new(ByTitle::new(self.playlists.clone()))
        } else {
            Box::new(stdin_prompt())
        }
    }
}
