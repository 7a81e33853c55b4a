//! SVG flamegraph generation through the external FlameGraph script.
//!
//! The collapsed stack file is streamed to `flamegraph.pl` on stdin and the
//! SVG it prints is saved unchanged.

use crate::output::write_svg;
use crate::runner::{Invocation, ProcessRunner};
use crate::utils::config::DEFAULT_TITLE;
use crate::utils::error::RenderError;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Renderer configuration
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Path to `flamegraph.pl` (or a compatible script)
    pub script: PathBuf,
    pub title: String,
    pub timeout: Option<Duration>,
}

impl RendererConfig {
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
            title: DEFAULT_TITLE.to_string(),
            timeout: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// `<script> --title <title>` with `input` on stdin
    pub fn to_invocation(&self, input: Vec<u8>) -> Invocation {
        Invocation::new(self.script.display().to_string())
            .args(["--title".to_string(), self.title.clone()])
            .stdin(input)
            .timeout(self.timeout)
    }
}

/// Render `collapsed_path` into an SVG at `svg_path`
///
/// # Errors
/// * `RenderError::ReadInput` - the collapsed file could not be read
/// * `RenderError::Runner` - the script could not be started or timed out
/// * `RenderError::RendererFailed` - the script exited non-zero
/// * `RenderError::Output` - the SVG could not be written
pub fn render_flamegraph<R: ProcessRunner>(
    runner: &R,
    config: &RendererConfig,
    collapsed_path: &Path,
    svg_path: &Path,
) -> Result<(), RenderError> {
    info!("Generating flame graph {}...", svg_path.display());

    let input = std::fs::read(collapsed_path).map_err(|source| RenderError::ReadInput {
        path: collapsed_path.to_path_buf(),
        source,
    })?;
    debug!("Feeding {} bytes of collapsed stacks to renderer", input.len());

    let output = runner.run(&config.to_invocation(input))?;

    if !output.success() {
        return Err(RenderError::RendererFailed {
            status: output.status_description(),
            stderr: output.stderr_text().trim().to_string(),
        });
    }

    write_svg(&output.stdout, svg_path)?;

    Ok(())
}
