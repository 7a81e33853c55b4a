//! Flamegraph generation using the external FlameGraph script.
//!
//! This module converts collapsed stack files into interactive SVG flamegraphs.

pub mod renderer;

// Re-export main types
pub use renderer::{render_flamegraph, RendererConfig};
