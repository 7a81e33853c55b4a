//! Convert command implementation.
//!
//! For every configured recording the convert command:
//! 1. Dumps execution samples with the JFR tool
//! 2. Folds them into collapsed stacks
//! 3. Writes `<stem>_collapsed.txt`
//! 4. Renders `<stem>_flamegraph.svg` with the FlameGraph script
//!
//! Only configuration problems abort the run. A missing or failing recording
//! is logged and the next one is processed.

use crate::aggregator::fold;
use crate::dump::{dump_recording, DumpRequest};
use crate::flamegraph::{render_flamegraph, RendererConfig};
use crate::output::{list_flamegraphs, write_collapsed, RecordingReport, RunReport};
use crate::runner::ProcessRunner;
use crate::utils::config::{COLLAPSED_SUFFIX, FLAMEGRAPH_SUFFIX};
use crate::utils::error::{ConfigError, DumpError};
use crate::utils::settings::{Config, RecordingSpec};
use anyhow::Result;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// The two files produced for one recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub collapsed: PathBuf,
    pub svg: PathBuf,
}

impl ArtifactPaths {
    /// `<output_dir>/<stem>_collapsed.txt` and `<output_dir>/<stem>_flamegraph.svg`
    pub fn for_recording(output_dir: &Path, recording: &Path) -> Self {
        let stem = recording
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            collapsed: output_dir.join(format!("{stem}{COLLAPSED_SUFFIX}")),
            svg: output_dir.join(format!("{stem}{FLAMEGRAPH_SUFFIX}")),
        }
    }
}

/// What happened to a single recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingOutcome {
    /// Both artifacts were written
    Rendered {
        artifacts: ArtifactPaths,
        unique_stacks: usize,
        total_samples: u64,
    },

    /// The recording file does not exist
    Skipped,

    /// The dump tool failed; nothing was written
    DumpFailed { error: String },

    /// The collapsed file could not be written
    WriteFailed { error: String },

    /// The collapsed file was written but the SVG was not
    RenderFailed {
        artifacts: ArtifactPaths,
        unique_stacks: usize,
        total_samples: u64,
        error: String,
    },
}

impl RecordingOutcome {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rendered { .. } => "rendered",
            Self::Skipped => "skipped",
            Self::DumpFailed { .. } => "dump_failed",
            Self::WriteFailed { .. } => "write_failed",
            Self::RenderFailed { .. } => "render_failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingResult {
    pub spec: RecordingSpec,
    /// Resolved recording path
    pub path: PathBuf,
    pub outcome: RecordingOutcome,
}

/// Result of a complete run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub results: Vec<RecordingResult>,

    /// Every `*_flamegraph.svg` in the output directory after the run
    pub flamegraphs: Vec<PathBuf>,

    pub elapsed: Duration,
}

impl RunSummary {
    pub fn rendered_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, RecordingOutcome::Rendered { .. }))
            .count()
    }

    pub fn to_report(&self) -> RunReport {
        let recordings = self
            .results
            .iter()
            .map(|result| {
                let mut report = RecordingReport {
                    label: result.spec.label.clone(),
                    recording: result.path.clone(),
                    outcome: result.outcome.name().to_string(),
                    unique_stacks: None,
                    total_samples: None,
                    collapsed: None,
                    svg: None,
                    error: None,
                };

                match &result.outcome {
                    RecordingOutcome::Rendered {
                        artifacts,
                        unique_stacks,
                        total_samples,
                    } => {
                        report.unique_stacks = Some(*unique_stacks);
                        report.total_samples = Some(*total_samples);
                        report.collapsed = Some(artifacts.collapsed.clone());
                        report.svg = Some(artifacts.svg.clone());
                    }
                    RecordingOutcome::RenderFailed {
                        artifacts,
                        unique_stacks,
                        total_samples,
                        error,
                    } => {
                        report.unique_stacks = Some(*unique_stacks);
                        report.total_samples = Some(*total_samples);
                        report.collapsed = Some(artifacts.collapsed.clone());
                        report.error = Some(error.clone());
                    }
                    RecordingOutcome::DumpFailed { error }
                    | RecordingOutcome::WriteFailed { error } => {
                        report.error = Some(error.clone());
                    }
                    RecordingOutcome::Skipped => {}
                }

                report
            })
            .collect();

        RunReport::new(recordings, self.flamegraphs.clone())
    }
}

/// Fail early unless the renderer script is present
///
/// **Public** - called before any subprocess is started
pub fn check_renderer(config: &Config) -> Result<PathBuf, ConfigError> {
    let script = config.renderer_path();
    if !script.is_file() {
        return Err(ConfigError::RendererMissing(script));
    }
    Ok(script)
}

/// Execute the convert command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// Only configuration errors (invalid settings, missing renderer script).
/// Per-recording failures are reported in the returned summary.
pub fn execute_convert<R: ProcessRunner>(config: &Config, runner: &R) -> Result<RunSummary> {
    let start_time = Instant::now();

    config.validate()?;
    let script = check_renderer(config)?;
    debug!("Using FlameGraph script at {}", script.display());

    let output_dir = config.output_dir();
    let renderer = RendererConfig::new(script)
        .with_title(config.title.clone())
        .with_timeout(config.timeout());

    let mut results = Vec::with_capacity(config.recordings.len());
    for spec in &config.recordings {
        let path = config.recording_path(spec);
        let outcome = process_recording(config, runner, &renderer, &output_dir, spec, &path);
        results.push(RecordingResult {
            spec: spec.clone(),
            path,
            outcome,
        });
    }

    let flamegraphs = list_flamegraphs(&output_dir).unwrap_or_else(|e| {
        warn!("Could not list {}: {}", output_dir.display(), e);
        Vec::new()
    });

    let summary = RunSummary {
        results,
        flamegraphs,
        elapsed: start_time.elapsed(),
    };

    print_summary(&summary);
    info!(
        "Rendered {}/{} recordings in {:.2}s",
        summary.rendered_count(),
        summary.results.len(),
        summary.elapsed.as_secs_f64()
    );

    Ok(summary)
}

/// Run dump, fold and render for one recording
///
/// **Private** - every failure becomes a logged outcome
fn process_recording<R: ProcessRunner>(
    config: &Config,
    runner: &R,
    renderer: &RendererConfig,
    output_dir: &Path,
    spec: &RecordingSpec,
    path: &Path,
) -> RecordingOutcome {
    if !path.exists() {
        warn!("Warning: {} not found, skipping...", path.display());
        return RecordingOutcome::Skipped;
    }

    info!("Processing {}...", spec.label);

    let request = DumpRequest {
        tool: &config.dump_tool,
        recording: path,
        event_type: &config.event_type,
        stack_depth: config.stack_depth,
        timeout: config.timeout(),
    };

    let text = match dump_recording(runner, &request) {
        Ok(text) => text,
        Err(e) => {
            log_dump_failure(&config.dump_tool, &e);
            return RecordingOutcome::DumpFailed {
                error: e.to_string(),
            };
        }
    };

    let folded = fold(&text, &config.event_type);
    if folded.pending_frames > 0 {
        debug!(
            "{}: trailing stack of {} frames had no terminator and was not counted",
            spec.label, folded.pending_frames
        );
    }

    let table = folded.table;
    let unique_stacks = table.len();
    let total_samples = table.total_samples();
    let artifacts = ArtifactPaths::for_recording(output_dir, path);

    if let Err(e) = write_collapsed(&table, &artifacts.collapsed) {
        warn!("  Error writing {}: {}", artifacts.collapsed.display(), e);
        return RecordingOutcome::WriteFailed {
            error: e.to_string(),
        };
    }

    match render_flamegraph(runner, renderer, &artifacts.collapsed, &artifacts.svg) {
        Ok(()) => RecordingOutcome::Rendered {
            artifacts,
            unique_stacks,
            total_samples,
        },
        Err(e) => {
            warn!("  Error generating flame graph: {}", e);
            RecordingOutcome::RenderFailed {
                artifacts,
                unique_stacks,
                total_samples,
                error: e.to_string(),
            }
        }
    }
}

fn log_dump_failure(tool: &str, error: &DumpError) {
    warn!("  Error running {} command: {}", tool, error);
    if let DumpError::ToolFailed { stdout, stderr, .. } = error {
        warn!("  stdout: {}", stdout.trim());
        warn!("  stderr: {}", stderr.trim());
    }
}

fn print_summary(summary: &RunSummary) {
    println!("\nDone! Flame graphs generated:");
    for svg in &summary.flamegraphs {
        println!("  - {}", svg.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_paths_use_stem() {
        let artifacts =
            ArtifactPaths::for_recording(Path::new("/out"), Path::new("/in/tfb-batch.jfr"));

        assert_eq!(artifacts.collapsed, PathBuf::from("/out/tfb-batch_collapsed.txt"));
        assert_eq!(artifacts.svg, PathBuf::from("/out/tfb-batch_flamegraph.svg"));
    }

    #[test]
    fn test_check_renderer_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_root(dir.path());

        match check_renderer(&config) {
            Err(ConfigError::RendererMissing(path)) => {
                assert_eq!(path, dir.path().join("FlameGraph/flamegraph.pl"));
            }
            other => panic!("expected RendererMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_outcome_names() {
        assert_eq!(RecordingOutcome::Skipped.name(), "skipped");
        assert_eq!(
            RecordingOutcome::DumpFailed {
                error: String::new()
            }
            .name(),
            "dump_failed"
        );
    }
}
