//! Output writers for collapsed stacks, flamegraphs and run reports.
//!
//! This module handles writing data to disk in various formats:
//! - Collapsed stack text (`<stem>_collapsed.txt`)
//! - SVG flamegraphs (`<stem>_flamegraph.svg`)
//! - JSON run reports
//!
//! All writes replace the whole file and are not atomic: a crash mid-write
//! leaves a partial file behind.

pub mod collapsed;
pub mod report;
pub mod svg;

use crate::utils::error::OutputError;
use log::debug;
use std::path::Path;

// Re-export main functions
pub use collapsed::write_collapsed;
pub use report::{write_report, RecordingReport, RunReport};
pub use svg::{list_flamegraphs, write_svg};

/// Validate an output path and create its parent directories
///
/// **Private** - shared by the writers in this module
fn prepare_output_path(path: &Path, expected_ext: &str) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    if path.extension().map_or(true, |ext| ext != expected_ext) {
        debug!(
            "Warning: File does not have .{} extension: {}",
            expected_ext,
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}
