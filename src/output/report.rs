//! JSON run report writer.
//!
//! Records what happened to each configured recording so CI jobs can pick up
//! the artifacts without scraping log output.

use crate::utils::config::SCHEMA_VERSION;
use crate::utils::error::OutputError;
use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Top-level report structure written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Schema version for compatibility checking
    pub version: String,

    /// Timestamp when the report was generated
    pub generated_at: String,

    /// One entry per configured recording, in configuration order
    pub recordings: Vec<RecordingReport>,

    /// Every flamegraph found in the output directory after the run
    pub flamegraphs: Vec<PathBuf>,
}

impl RunReport {
    pub fn new(recordings: Vec<RecordingReport>, flamegraphs: Vec<PathBuf>) -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            generated_at: Utc::now().to_rfc3339(),
            recordings,
            flamegraphs,
        }
    }
}

/// Outcome for a single recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingReport {
    pub label: String,
    pub recording: PathBuf,

    /// `rendered`, `skipped`, `dump_failed`, `write_failed` or `render_failed`
    pub outcome: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_stacks: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_samples: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub svg: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Write a run report as pretty JSON
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_report(report: &RunReport, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing run report to: {}", output_path.display());

    super::prepare_output_path(output_path, "json")?;

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, report)
        .map_err(OutputError::SerializationFailed)?;
    writer.flush().map_err(OutputError::WriteFailed)?;

    debug!("Run report covers {} recordings", report.recordings.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_report() -> RunReport {
        RunReport::new(
            vec![
                RecordingReport {
                    label: "Baseline".to_string(),
                    recording: PathBuf::from("base.jfr"),
                    outcome: "rendered".to_string(),
                    unique_stacks: Some(12),
                    total_samples: Some(400),
                    collapsed: Some(PathBuf::from("base_collapsed.txt")),
                    svg: Some(PathBuf::from("base_flamegraph.svg")),
                    error: None,
                },
                RecordingReport {
                    label: "Missing".to_string(),
                    recording: PathBuf::from("gone.jfr"),
                    outcome: "skipped".to_string(),
                    unique_stacks: None,
                    total_samples: None,
                    collapsed: None,
                    svg: None,
                    error: None,
                },
            ],
            vec![PathBuf::from("base_flamegraph.svg")],
        )
    }

    #[test]
    fn test_written_report_parses_back() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("reports/run.json");
        let report = create_test_report();

        write_report(&report, &path).unwrap();
        let loaded: RunReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(loaded, report);
        assert_eq!(loaded.version, SCHEMA_VERSION);
    }

    #[test]
    fn test_skipped_entry_omits_empty_fields() {
        let report = create_test_report();
        let json = serde_json::to_value(&report.recordings[1]).unwrap();

        assert_eq!(json["outcome"], "skipped");
        assert!(json.get("svg").is_none());
        assert!(json.get("error").is_none());
    }
}
