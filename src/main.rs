//! JFR Flamegraph CLI
//!
//! Converts Java Flight Recorder recordings into Flame Graph SVGs using the
//! `jfr` dump tool and Brendan Gregg's `flamegraph.pl`.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use std::io::Read;
use std::path::PathBuf;

use jfr_flamegraph::aggregator::fold;
use jfr_flamegraph::commands::{execute_convert, ConfigOverrides};
use jfr_flamegraph::output::{write_collapsed, write_report};
use jfr_flamegraph::runner::SystemRunner;
use jfr_flamegraph::utils::config::DEFAULT_EVENT_TYPE;
use jfr_flamegraph::utils::RecordingSpec;

/// JFR Flamegraph - flame graphs from Java Flight Recorder recordings
#[derive(Parser, Debug)]
#[command(name = "jfr-flamegraph")]
#[command(version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Subcommand to execute (defaults to `convert`)
    #[command(subcommand)]
    command: Option<Commands>,

    /// `convert` options used when no subcommand is given
    #[command(flatten)]
    convert: ConvertOpts,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert the configured recordings into flame graphs
    Convert(ConvertOpts),

    /// Fold a saved `jfr print` dump into collapsed stacks
    Fold {
        /// Dump text file (`-` for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Collapsed output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Event header that separates samples
        #[arg(long, default_value = DEFAULT_EVENT_TYPE)]
        event: String,
    },

    /// Print the effective configuration as TOML
    Config(SettingsOpts),
}

#[derive(Args, Debug)]
struct ConvertOpts {
    #[command(flatten)]
    settings: SettingsOpts,

    /// Write a JSON run report to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SettingsOpts {
    /// TOML config file
    #[arg(short, long, env = "JFR_FLAMEGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding recordings and the FlameGraph checkout
    #[arg(short, long, env = "JFR_FLAMEGRAPH_ROOT")]
    root: Option<PathBuf>,

    /// Artifact directory (defaults to the root directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// FlameGraph script, relative to the root directory
    #[arg(long)]
    renderer: Option<PathBuf>,

    /// JFR dump tool
    #[arg(long, env = "JFR_TOOL")]
    dump_tool: Option<String>,

    /// Event type to extract
    #[arg(long)]
    event: Option<String>,

    /// Maximum stack depth to dump
    #[arg(long)]
    stack_depth: Option<u32>,

    /// Flame graph title
    #[arg(long)]
    title: Option<String>,

    /// Per-subprocess timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Recording as `file` or `file=label` (repeatable, replaces the configured list)
    #[arg(long = "recording")]
    recordings: Vec<RecordingSpec>,
}

impl From<SettingsOpts> for ConfigOverrides {
    fn from(opts: SettingsOpts) -> Self {
        Self {
            config_file: opts.config,
            root_dir: opts.root,
            output_dir: opts.output_dir,
            renderer_script: opts.renderer,
            dump_tool: opts.dump_tool,
            event_type: opts.event,
            stack_depth: opts.stack_depth,
            title: opts.title,
            timeout_secs: opts.timeout,
            recordings: opts.recordings,
        }
    }
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command.unwrap_or(Commands::Convert(cli.convert)) {
        Commands::Convert(opts) => {
            let config = ConfigOverrides::from(opts.settings).resolve()?;
            let summary = execute_convert(&config, &SystemRunner::new())?;

            if let Some(report_path) = opts.report {
                write_report(&summary.to_report(), &report_path)
                    .context("Failed to write run report")?;
            }
        }

        Commands::Fold {
            input,
            output,
            event,
        } => {
            fold_dump_file(input, output, &event)?;
        }

        Commands::Config(opts) => {
            let config = ConfigOverrides::from(opts).resolve()?;
            print!(
                "{}",
                toml::to_string_pretty(&config).context("Failed to serialize config")?
            );
        }
    }

    Ok(())
}

/// Fold a saved dump without running any external tool
///
/// **Private** - internal command implementation
fn fold_dump_file(input: PathBuf, output: Option<PathBuf>, event: &str) -> Result<()> {
    let text = if input.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read dump from stdin")?;
        text
    } else {
        std::fs::read_to_string(&input)
            .with_context(|| format!("Failed to read dump {}", input.display()))?
    };

    let table = fold(&text, event).table;

    match output {
        Some(path) => {
            write_collapsed(&table, &path).context("Failed to write collapsed stacks")?;
        }
        None => {
            for stack in table.sorted() {
                println!("{}", stack.to_line());
            }
        }
    }

    Ok(())
}
