//! Configuration and constants for the CLI.

/// Current run report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Dump tool invoked when none is configured
pub const DEFAULT_DUMP_TOOL: &str = "jfr";

/// Sampled-stack event extracted from every recording
pub const DEFAULT_EVENT_TYPE: &str = "jdk.ExecutionSample";

/// Maximum stack depth requested from the dump tool
pub const DEFAULT_STACK_DEPTH: u32 = 999;

/// Title passed to the renderer
pub const DEFAULT_TITLE: &str = "CPU Profile";

/// Renderer script, relative to the root directory
pub const DEFAULT_RENDERER_SCRIPT: &str = "FlameGraph/flamegraph.pl";

/// Root directory used when nothing else is configured
pub const DEFAULT_ROOT_DIR: &str = "profiling-results";

// Artifact naming: <stem>_collapsed.txt and <stem>_flamegraph.svg
pub const COLLAPSED_SUFFIX: &str = "_collapsed.txt";
pub const FLAMEGRAPH_SUFFIX: &str = "_flamegraph.svg";

// Line classification for the dump text
pub const SEPARATOR_PREFIX: &str = "---";
pub const LIST_MARKER_PREFIX: &str = "- ";
pub const TRACE_LABEL_PREFIX: &str = "stackTrace:";
pub const STRUCTURAL_PREFIX: char = '=';
pub const NULL_FRAME: &str = "null";

/// Delimiter between frames in a folded signature
pub const FRAME_DELIMITER: &str = ";";

/// Recordings processed when no list is configured: (file name, label)
pub const DEFAULT_RECORDINGS: &[(&str, &str)] = &[
    (
        "tfb-batch-update-database.jfr",
        "DatabaseExposedTransactionProvider",
    ),
    (
        "tfb-batch-update-jdbc.jfr",
        "JdbcTransactionExposedTransactionProvider",
    ),
];
