//! Aggregation of dump text into collapsed stacks.
//!
//! This module turns the leaf-first sample listing printed by the dump tool
//! into root-first folded signatures with sample counts.

pub mod stack_folder;

// Re-export main types and functions
pub use stack_folder::{fold, fold_stacks, CollapsedStack, FoldResult, StackCountTable, StackFolder};
