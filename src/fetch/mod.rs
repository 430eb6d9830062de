//! Per-playlist track fetching.
//!
//! - [`paths`]: naming rules and the existence check
//! - [`coordinator`]: the concurrent download/convert pipeline

pub mod coordinator;
pub mod paths;

pub use coordinator::{FetchCoordinator, FetchReport, TrackFailure};
pub use paths::{compressed_path, expected_final_path, find_existing, is_lossless};
