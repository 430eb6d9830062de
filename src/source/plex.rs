//! Plex Media Server client.
//!
//! Talks to the handful of JSON endpoints the exporter needs and streams
//! track files to disk.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use crate::error::{ErrorCode, ExportError, Result};
use crate::fetch::paths::{download_path, partial_path};
use crate::types::{PlaylistSummary, TrackDescriptor};

use super::MediaSource;

/// Connect timeout for all requests. Transfers themselves are bounded by the
/// per-track timeout instead.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for small JSON requests.
const API_TIMEOUT: Duration = Duration::from_secs(60);

/// Header carrying the access token.
const TOKEN_HEADER: &str = "X-Plex-Token";

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "MediaContainer")]
    media_container: MediaContainer,
}

#[derive(Debug, Default, Deserialize)]
struct MediaContainer {
    #[serde(rename = "Metadata", default)]
    metadata: Vec<Metadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Metadata {
    rating_key: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    playlist_type: Option<String>,
    #[serde(default)]
    leaf_count: Option<u32>,
    #[serde(default)]
    duration: Option<u64>,
    #[serde(rename = "Media", default)]
    media: Vec<Media>,
}

#[derive(Debug, Deserialize)]
struct Media {
    #[serde(default)]
    duration: Option<u64>,
    #[serde(rename = "Part", default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    key: String,
    #[serde(default)]
    file: Option<String>,
}

impl Metadata {
    fn into_playlist(self) -> Option<PlaylistSummary> {
        match self.playlist_type.as_deref() {
            Some("audio") => Some(PlaylistSummary {
                id: self.rating_key,
                title: self.title,
                track_count: self.leaf_count,
            }),
            _ => None,
        }
    }

    fn into_descriptor(self) -> Option<TrackDescriptor> {
        let media = self.media.into_iter().next()?;
        let part = media.parts.into_iter().next()?;
        let server_path = part.file.unwrap_or_else(|| part.key.clone());
        let descriptor = TrackDescriptor::new(
            self.title,
            media.duration.or(self.duration),
            part.key,
            &server_path,
        );
        match descriptor.file_name.as_str() {
            "" | "." | ".." => None,
            _ => Some(descriptor),
        }
    }
}

/// Parses a `/playlists` response, keeping audio playlists only.
fn parse_playlists(body: &str) -> serde_json::Result<Vec<PlaylistSummary>> {
    let envelope: Envelope = serde_json::from_str(body)?;
    Ok(envelope
        .media_container
        .metadata
        .into_iter()
        .filter_map(Metadata::into_playlist)
        .collect())
}

/// Parses a `/playlists/{id}/items` response.
///
/// Entries without a media part, or whose file path has no usable base
/// name, cannot be downloaded and are dropped.
fn parse_tracks(body: &str) -> serde_json::Result<Vec<TrackDescriptor>> {
    let envelope: Envelope = serde_json::from_str(body)?;
    let mut tracks = Vec::with_capacity(envelope.media_container.metadata.len());
    for item in envelope.media_container.metadata {
        let title = item.title.clone();
        match item.into_descriptor() {
            Some(descriptor) => tracks.push(descriptor),
            None => log::warn!("Skipping \"{}\": no usable media file in listing", title),
        }
    }
    Ok(tracks)
}

/// Client for one Plex server.
pub struct PlexClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl PlexClient {
    /// Creates a client for `base_url` authenticated with `token`.
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url).map_err(|e| {
            ExportError::with_source(
                ErrorCode::ClientInitFailed,
                format!("Invalid server URL {}", base_url),
                e,
            )
        })?;

        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| {
                ExportError::with_source(
                    ErrorCode::ClientInitFailed,
                    "Failed to create HTTP client",
                    e,
                )
            })?;

        Ok(Self {
            http,
            base_url,
            token: token.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(self.url(path))
            .header(TOKEN_HEADER, &self.token)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    /// GETs `path` and returns the body of a successful response.
    async fn get_text(&self, path: &str, code: ErrorCode) -> Result<String> {
        let response = self
            .request(path)
            .timeout(API_TIMEOUT)
            .send()
            .await
            .map_err(|e| ExportError::with_source(code, format!("GET {} failed", path), e))?;

        if !response.status().is_success() {
            return Err(ExportError::new(
                code,
                format!("HTTP {} for {}", response.status(), path),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| ExportError::with_source(code, format!("Failed to read {}", path), e))
    }

    async fn stream_to_file(&self, track: &TrackDescriptor, partial: &Path) -> Result<()> {
        let download_failed = |message: String| ExportError::new(ErrorCode::DownloadFailed, message);

        let mut response = self
            .request(&track.remote_ref)
            .query(&[("download", "1")])
            .send()
            .await
            .map_err(|e| {
                ExportError::with_source(
                    ErrorCode::DownloadFailed,
                    format!("Failed to download \"{}\"", track.title),
                    e,
                )
            })?;

        if !response.status().is_success() {
            return Err(download_failed(format!(
                "HTTP {} for \"{}\"",
                response.status(),
                track.title
            )));
        }

        let mut file = tokio::fs::File::create(partial)
            .await
            .map_err(|e| ExportError::filesystem("create", partial, e))?;

        let mut downloaded: u64 = 0;
        while let Some(chunk) = response.chunk().await.map_err(|e| {
            ExportError::with_source(
                ErrorCode::DownloadFailed,
                format!("Failed to read response for \"{}\"", track.title),
                e,
            )
        })? {
            file.write_all(&chunk)
                .await
                .map_err(|e| ExportError::filesystem("write", partial, e))?;
            downloaded += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| ExportError::filesystem("flush", partial, e))?;

        log::debug!(
            "Transferred {:.1} MB for \"{}\"",
            downloaded as f64 / (1024.0 * 1024.0),
            track.title
        );
        Ok(())
    }
}

#[async_trait]
impl MediaSource for PlexClient {
    fn name(&self) -> &'static str {
        "plex"
    }

    async fn ping(&self) -> Result<()> {
        self.get_text("/", ErrorCode::ServerUnreachable).await?;
        Ok(())
    }

    async fn list_playlists(&self) -> Result<Vec<PlaylistSummary>> {
        let body = self
            .get_text("/playlists", ErrorCode::CatalogFetchFailed)
            .await?;
        parse_playlists(&body).map_err(|e| {
            ExportError::with_source(
                ErrorCode::CatalogFetchFailed,
                "Unexpected playlist catalog payload",
                e,
            )
        })
    }

    async fn list_tracks(&self, playlist_id: &str) -> Result<Vec<TrackDescriptor>> {
        let path = format!("/playlists/{}/items", playlist_id);
        let body = self
            .get_text(&path, ErrorCode::PlaylistFetchFailed)
            .await?;
        parse_tracks(&body).map_err(|e| {
            ExportError::with_source(
                ErrorCode::PlaylistFetchFailed,
                format!("Unexpected listing payload for playlist {}", playlist_id),
                e,
            )
        })
    }

    async fn download_track(&self, track: &TrackDescriptor, dest_dir: &Path) -> Result<PathBuf> {
        let dest = download_path(track, dest_dir);
        let partial = partial_path(&dest);

        if let Err(e) = self.stream_to_file(track, &partial).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }

        tokio::fs::rename(&partial, &dest)
            .await
            .map_err(|e| ExportError::filesystem("rename", &partial, e))?;
        Ok(dest)
    }
}
