use crate::utils::error::ConfigError;
use crate::utils::settings::{Config, RecordingSpec};
use std::path::PathBuf;

/// Settings given on the command line
///
/// **Public** - built by main.rs, layered over the config file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Optional TOML config file
    pub config_file: Option<PathBuf>,

    pub root_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub renderer_script: Option<PathBuf>,
    pub dump_tool: Option<String>,
    pub event_type: Option<String>,
    pub stack_depth: Option<u32>,
    pub title: Option<String>,
    pub timeout_secs: Option<u64>,

    /// Replaces the configured list when non-empty
    pub recordings: Vec<RecordingSpec>,
}

impl ConfigOverrides {
    /// Defaults, then the config file, then these overrides
    pub fn resolve(self) -> Result<Config, ConfigError> {
        let mut config = match &self.config_file {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(root_dir) = self.root_dir {
            config.root_dir = root_dir;
        }
        if let Some(output_dir) = self.output_dir {
            config.output_dir = Some(output_dir);
        }
        if let Some(renderer_script) = self.renderer_script {
            config.renderer_script = renderer_script;
        }
        if let Some(dump_tool) = self.dump_tool {
            config.dump_tool = dump_tool;
        }
        if let Some(event_type) = self.event_type {
            config.event_type = event_type;
        }
        if let Some(stack_depth) = self.stack_depth {
            config.stack_depth = stack_depth;
        }
        if let Some(title) = self.title {
            config.title = title;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.timeout_secs = Some(timeout_secs);
        }
        if !self.recordings.is_empty() {
            config.recordings = self.recordings;
        }

        Ok(config)
    }
}
