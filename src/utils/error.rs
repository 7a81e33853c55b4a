//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that abort the whole run before any recording is processed
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("FlameGraph script not found at {}", .0.display())]
    RendererMissing(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to read config file {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Malformed(#[from] toml::de::Error),
}

/// Errors raised while running an external program
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` timed out after {}s", .timeout.as_secs_f64())]
    TimedOut { program: String, timeout: Duration },

    #[error("IO error while talking to `{program}`: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the dump tool invocation
#[derive(Error, Debug)]
pub enum DumpError {
    #[error("Dump tool exited with {status}")]
    ToolFailed {
        status: String,
        stdout: String,
        stderr: String,
    },

    #[error(transparent)]
    Runner(#[from] RunnerError),
}

/// Errors from flame graph rendering
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to read collapsed stacks {}: {source}", path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Renderer exited with {status}: {stderr}")]
    RendererFailed { status: String, stderr: String },

    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
