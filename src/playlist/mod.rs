//! Playlist manifest output.

pub mod manifest;

pub use manifest::{manifest_path, render_manifest, sanitize_file_name, write_manifest};
