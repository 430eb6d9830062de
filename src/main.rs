//! plex-playlist-export: copy Plex audio playlists to disk.
//!
//! Reads server credentials from the environment, lets the user pick
//! playlists, downloads and transcodes their tracks, and writes one M3U
//! manifest per playlist.

use plex_playlist_export::cli::Cli;
use plex_playlist_export::config::ExportConfig;
use plex_playlist_export::error::{ErrorCode, ExportError, Result};
use plex_playlist_export::export::run_export;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{}", e);
        log::error!("Hint: {}", e.code.recovery_hint());
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let mut config = ExportConfig::from_env()?;
    cli.apply(&mut config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            ExportError::with_source(
                ErrorCode::ClientInitFailed,
                "Failed to start async runtime",
                e,
            )
        })?;

    let mut selector = cli.selector();

    runtime.block_on(async {
        tokio::select! {
            result = run_export(&config, &cli.out_dir, selector.as_mut()) => result.map(|_| ()),
            Ok(()) = tokio::signal::ctrl_c() => {
                log::warn!("Interrupted, stopping export");
                Err(ExportError::interrupted())
            }
        }
    })
}
