//! CLI command implementations.
//!
//! Commands orchestrate the various library components to perform user tasks.

pub mod convert;
pub mod models;

// Re-export main command functions
pub use convert::{
    check_renderer, execute_convert, ArtifactPaths, RecordingOutcome, RecordingResult, RunSummary,
};
pub use models::ConfigOverrides;
