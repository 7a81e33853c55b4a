//! JFR Flamegraph
//!
//! Converts Java Flight Recorder recordings into Flame Graph SVGs by
//! orchestrating two external programs: the `jfr` text-dump tool and the
//! FlameGraph `flamegraph.pl` renderer.
//!
//! ## Pipeline
//!
//! 1. [`dump`] runs `jfr print` and captures the sample listing
//! 2. [`aggregator`] folds the listing into collapsed stacks
//! 3. [`flamegraph`] streams the collapsed stacks into the renderer
//!
//! [`commands::execute_convert`] drives the pipeline over every configured
//! recording. External programs are reached through [`runner::ProcessRunner`].

pub mod aggregator;
pub mod commands;
pub mod dump;
pub mod flamegraph;
pub mod output;
pub mod runner;
pub mod utils;
