//! Fold `jfr print` text output into collapsed stacks.
//!
//! Collapsed stacks are the input format for flamegraph generation.
//! Format: "root;caller;leaf count"
//!
//! The dump lists each sample leaf-first, one frame per line, with samples
//! separated by blank lines, `---` runs or the event header. Folding reverses
//! each sample so the root comes first and counts identical stacks.

use crate::utils::config::{
    FRAME_DELIMITER, LIST_MARKER_PREFIX, NULL_FRAME, SEPARATOR_PREFIX, STRUCTURAL_PREFIX,
    TRACE_LABEL_PREFIX,
};
use log::debug;
use std::collections::HashMap;

/// A single collapsed stack entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsedStack {
    /// Stack trace as semicolon-separated string, root first
    pub stack: String,

    /// Number of samples with exactly this stack
    pub count: u64,
}

impl CollapsedStack {
    pub fn new(stack: impl Into<String>, count: u64) -> Self {
        Self {
            stack: stack.into(),
            count,
        }
    }

    /// Render as a collapsed-format line (without newline)
    pub fn to_line(&self) -> String {
        format!("{} {}", self.stack, self.count)
    }
}

/// Folded signature -> sample count, remembering first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackCountTable {
    entries: Vec<CollapsedStack>,
    index: HashMap<String, usize>,
}

impl StackCountTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more sample of `signature`. Empty signatures are ignored.
    pub fn increment(&mut self, signature: String) {
        if signature.is_empty() {
            return;
        }
        match self.index.get(&signature) {
            Some(&i) => self.entries[i].count += 1,
            None => {
                self.index.insert(signature.clone(), self.entries.len());
                self.entries.push(CollapsedStack::new(signature, 1));
            }
        }
    }

    pub fn get(&self, signature: &str) -> Option<u64> {
        self.index.get(signature).map(|&i| self.entries[i].count)
    }

    /// Number of distinct stacks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts
    pub fn total_samples(&self) -> u64 {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Entries in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &CollapsedStack> {
        self.entries.iter()
    }

    /// Entries sorted by descending count; ties keep first-seen order
    pub fn sorted(&self) -> Vec<CollapsedStack> {
        let mut stacks = self.entries.clone();
        stacks.sort_by(|a, b| b.count.cmp(&a.count));
        stacks
    }
}

/// How a single trimmed dump line affects folding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind<'a> {
    /// Ends the current sample
    Terminator,
    /// Not a frame, no state change
    Ignored,
    Frame(&'a str),
}

fn classify<'a>(line: &'a str, event_type: &str) -> LineKind<'a> {
    if line.is_empty()
        || line.starts_with(SEPARATOR_PREFIX)
        || (!event_type.is_empty() && line.starts_with(event_type))
    {
        LineKind::Terminator
    } else if line.starts_with(LIST_MARKER_PREFIX)
        || line.starts_with(TRACE_LABEL_PREFIX)
        || line.starts_with(STRUCTURAL_PREFIX)
        || line == NULL_FRAME
    {
        LineKind::Ignored
    } else {
        LineKind::Frame(line)
    }
}

#[derive(Debug, Default)]
enum FoldState {
    #[default]
    Idle,
    /// Frames of the current sample, leaf first
    Accumulating(Vec<String>),
}

/// Result of folding a complete dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldResult {
    pub table: StackCountTable,

    /// Frames of a trailing sample that was never terminated (not counted)
    pub pending_frames: usize,
}

/// Line-at-a-time folding state machine
#[derive(Debug)]
pub struct StackFolder {
    event_type: String,
    state: FoldState,
    table: StackCountTable,
}

impl StackFolder {
    /// `event_type` lines (e.g. `jdk.ExecutionSample`) act as sample terminators
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            state: FoldState::Idle,
            table: StackCountTable::new(),
        }
    }

    pub fn feed_line(&mut self, raw: &str) {
        let line = raw.trim();

        match classify(line, &self.event_type) {
            LineKind::Terminator => {
                if let FoldState::Accumulating(frames) = std::mem::take(&mut self.state) {
                    let signature = frames
                        .iter()
                        .rev()
                        .map(String::as_str)
                        .collect::<Vec<_>>()
                        .join(FRAME_DELIMITER);
                    self.table.increment(signature);
                }
            }
            LineKind::Ignored => {}
            LineKind::Frame(frame) => {
                let mut frames = match std::mem::take(&mut self.state) {
                    FoldState::Accumulating(frames) => frames,
                    FoldState::Idle => Vec::new(),
                };
                frames.push(frame.to_string());
                self.state = FoldState::Accumulating(frames);
            }
        }
    }

    /// Feed a whole dump. A final `\n` yields one last empty line, which
    /// terminates the last sample like any other blank line.
    pub fn feed(&mut self, text: &str) {
        for line in text.split('\n') {
            self.feed_line(line);
        }
    }

    /// Stop folding. A trailing sample without a terminator is dropped.
    pub fn finish(self) -> FoldResult {
        let pending_frames = match &self.state {
            FoldState::Accumulating(frames) => frames.len(),
            FoldState::Idle => 0,
        };

        if pending_frames > 0 {
            debug!(
                "Dropping unterminated trailing stack ({} frames)",
                pending_frames
            );
        }

        debug!(
            "Folded {} samples into {} unique stacks",
            self.table.total_samples(),
            self.table.len()
        );

        FoldResult {
            table: self.table,
            pending_frames,
        }
    }
}

/// Fold a complete dump
pub fn fold(text: &str, event_type: &str) -> FoldResult {
    let mut folder = StackFolder::new(event_type);
    folder.feed(text);
    folder.finish()
}

/// Fold a complete dump, keeping only the count table
pub fn fold_stacks(text: &str, event_type: &str) -> StackCountTable {
    fold(text, event_type).table
}
