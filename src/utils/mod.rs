//! Utility modules for configuration, error handling, and logging.

pub mod config;
pub mod error;
pub mod settings;

// Re-export commonly used error types for convenience
pub use error::{ConfigError, DumpError, OutputError, RenderError, RunnerError};
pub use settings::{Config, RecordingSpec};
