//! Post-export sweep of intermediate files.
//!
//! Removes lossless sources that survived conversion and `.part` files left
//! by interrupted downloads or conversions.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{ErrorCode, ExportError, Result};
use crate::fetch::paths::{is_lossless, is_partial};

/// Counts of files removed by [`remove_intermediate_files`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupReport {
    pub lossless_removed: usize,
    pub partial_removed: usize,
}

/// Recursively removes lossless and partial files under `root`.
///
/// Any walk or remove error aborts the sweep.
pub fn remove_intermediate_files(root: &Path) -> Result<CleanupReport> {
    let mut report = CleanupReport::default();

    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| {
            ExportError::with_source(
                ErrorCode::FilesystemError,
                format!("Failed to walk {}", root.display()),
                e,
            )
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let lossless = is_lossless(path);
        if !lossless && !is_partial(path) {
            continue;
        }

        fs::remove_file(path).map_err(|e| ExportError::filesystem("remove", path, e))?;
        if lossless {
            report.lossless_removed += 1;
            log::info!("Removed lossless file: {}", path.display());
        } else {
            report.partial_removed += 1;
            log::info!("Removed partial file: {}", path.display());
        }
    }

    Ok(report)
}
