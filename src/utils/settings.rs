//! Run configuration: which recordings to convert and how to call the tools.
//!
//! Values come from (lowest to highest precedence) the built-in defaults,
//! an optional TOML file, and CLI flags applied by `main.rs`.

use super::config::{
    DEFAULT_DUMP_TOOL, DEFAULT_EVENT_TYPE, DEFAULT_RECORDINGS, DEFAULT_RENDERER_SCRIPT,
    DEFAULT_ROOT_DIR, DEFAULT_STACK_DEPTH, DEFAULT_TITLE,
};
use super::error::ConfigError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// One recording to convert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingSpec {
    /// File name (or path) of the recording, resolved against the root directory
    pub file: PathBuf,

    /// Human-readable label used in progress output
    pub label: String,
}

impl RecordingSpec {
    pub fn new(file: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            label: label.into(),
        }
    }
}

/// Parses `file` or `file=label`. Without a label the file stem is used.
impl FromStr for RecordingSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (file, label) = match s.split_once('=') {
            Some((file, label)) => (file.trim(), label.trim().to_string()),
            None => {
                let file = s.trim();
                let stem = Path::new(file)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                (file, stem)
            }
        };

        if file.is_empty() {
            return Err(format!("recording file missing in '{}'", s));
        }
        if label.is_empty() {
            return Err(format!("recording label missing in '{}'", s));
        }

        Ok(Self::new(file, label))
    }
}

/// Complete run configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding the recordings and the renderer script
    pub root_dir: PathBuf,

    /// Where artifacts are written (defaults to `root_dir`)
    pub output_dir: Option<PathBuf>,

    /// Renderer script, relative to `root_dir` unless absolute
    pub renderer_script: PathBuf,

    /// Dump tool program name or path
    pub dump_tool: String,

    /// Event type requested from the dump tool
    pub event_type: String,

    /// Maximum stack depth requested from the dump tool
    pub stack_depth: u32,

    /// Flame graph title
    pub title: String,

    /// Per-subprocess timeout in seconds (none = wait forever)
    pub timeout_secs: Option<u64>,

    /// Recordings to convert, in order
    pub recordings: Vec<RecordingSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from(DEFAULT_ROOT_DIR),
            output_dir: None,
            renderer_script: PathBuf::from(DEFAULT_RENDERER_SCRIPT),
            dump_tool: DEFAULT_DUMP_TOOL.to_string(),
            event_type: DEFAULT_EVENT_TYPE.to_string(),
            stack_depth: DEFAULT_STACK_DEPTH,
            title: DEFAULT_TITLE.to_string(),
            timeout_secs: None,
            recordings: DEFAULT_RECORDINGS
                .iter()
                .map(|(file, label)| RecordingSpec::new(*file, *label))
                .collect(),
        }
    }
}

impl Config {
    /// Default configuration rooted at `root_dir`
    pub fn with_root(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_recordings(mut self, recordings: Vec<RecordingSpec>) -> Self {
        self.recordings = recordings;
        self
    }

    /// Load a TOML config file. Missing keys fall back to defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Loading config from {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Reject settings that cannot produce a meaningful run
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recordings.is_empty() {
            return Err(ConfigError::Invalid("no recordings configured".to_string()));
        }

        if self.event_type.trim().is_empty() {
            return Err(ConfigError::Invalid("event type cannot be empty".to_string()));
        }

        if self.stack_depth == 0 {
            return Err(ConfigError::Invalid(
                "stack depth must be greater than 0".to_string(),
            ));
        }

        if self.title.trim().is_empty() {
            return Err(ConfigError::Invalid("title cannot be empty".to_string()));
        }

        if self.dump_tool.trim().is_empty() {
            return Err(ConfigError::Invalid("dump tool cannot be empty".to_string()));
        }

        if self.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn renderer_path(&self) -> PathBuf {
        self.resolve(&self.renderer_script)
    }

    pub fn output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => self.resolve(dir),
            None => self.root_dir.clone(),
        }
    }

    pub fn recording_path(&self, recording: &RecordingSpec) -> PathBuf {
        self.resolve(&recording.file)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root_dir.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_match_reference_run() {
        let config = Config::default();

        assert_eq!(config.event_type, "jdk.ExecutionSample");
        assert_eq!(config.stack_depth, 999);
        assert_eq!(config.title, "CPU Profile");
        assert_eq!(config.recordings.len(), 2);
        assert_eq!(
            config.renderer_path(),
            PathBuf::from("profiling-results/FlameGraph/flamegraph.pl")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            root_dir = "/data/profiles"
            timeout_secs = 30

            [[recordings]]
            file = "app.jfr"
            label = "App"
            "#,
        )
        .unwrap();

        assert_eq!(config.root_dir, PathBuf::from("/data/profiles"));
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.recordings, vec![RecordingSpec::new("app.jfr", "App")]);
        assert_eq!(config.dump_tool, "jfr");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = Config::from_toml_str("stack_dept = 10");
        assert!(matches!(result, Err(ConfigError::Malformed(_))));
    }

    #[test]
    fn test_output_dir_resolution() {
        let mut config = Config::with_root("/root-dir");
        assert_eq!(config.output_dir(), PathBuf::from("/root-dir"));

        config.output_dir = Some(PathBuf::from("out"));
        assert_eq!(config.output_dir(), PathBuf::from("/root-dir/out"));

        config.output_dir = Some(PathBuf::from("/elsewhere"));
        assert_eq!(config.output_dir(), PathBuf::from("/elsewhere"));
    }

    #[test]
    fn test_validate_rejects_empty_recordings() {
        let config = Config::default().with_recordings(Vec::new());
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_zero_depth_and_timeout() {
        let config = Config {
            stack_depth: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            timeout_secs: Some(0),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_recording_spec_from_str() {
        let spec: RecordingSpec = "run.jfr=Baseline".parse().unwrap();
        assert_eq!(spec, RecordingSpec::new("run.jfr", "Baseline"));

        let spec: RecordingSpec = "traces/run.jfr".parse().unwrap();
        assert_eq!(spec, RecordingSpec::new("traces/run.jfr", "run"));

        assert!("=Label".parse::<RecordingSpec>().is_err());
        assert!("run.jfr=".parse::<RecordingSpec>().is_err());
    }
}
