//! SVG flamegraph output writer.
//!
//! The renderer's stdout is written to disk verbatim.

use crate::utils::config::FLAMEGRAPH_SUFFIX;
use crate::utils::error::OutputError;
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Write SVG content to a file
///
/// **Public** - main entry point for SVG output
///
/// # Arguments
/// * `svg_content` - Raw renderer output
/// * `output_path` - Path to output SVG file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::InvalidPath` - Path is invalid
pub fn write_svg(svg_content: &[u8], output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    super::prepare_output_path(output_path, "svg")?;

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let mut writer = BufWriter::new(file);

    writer
        .write_all(svg_content)
        .map_err(OutputError::WriteFailed)?;
    writer.flush().map_err(OutputError::WriteFailed)?;

    let file_size = svg_content.len();
    info!(
        "  Created {} ({:.2} KB)",
        output_path.display(),
        file_size as f64 / 1024.0
    );

    Ok(())
}

/// List every `*_flamegraph.svg` in a directory, sorted by path
///
/// A missing directory yields an empty list.
pub fn list_flamegraphs(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, OutputError> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut svgs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(FLAMEGRAPH_SUFFIX));
        if matches && path.is_file() {
            svgs.push(path);
        }
    }

    svgs.sort();
    Ok(svgs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    const VALID_SVG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
  <rect x="0" y="0" width="100" height="100" fill="red"/>
</svg>"#;

    #[test]
    fn test_write_verbatim() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        write_svg(VALID_SVG.as_bytes(), path).unwrap();

        assert_eq!(std::fs::read_to_string(path).unwrap(), VALID_SVG);
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested_path = temp_dir.path().join("nested/dirs/flamegraph.svg");

        write_svg(VALID_SVG.as_bytes(), &nested_path).unwrap();

        assert!(nested_path.exists());
    }

    #[test]
    fn test_list_flamegraphs() {
        let temp_dir = tempfile::tempdir().unwrap();
        for name in ["b_flamegraph.svg", "a_flamegraph.svg", "a_collapsed.txt", "other.svg"] {
            std::fs::write(temp_dir.path().join(name), "x").unwrap();
        }

        let svgs = list_flamegraphs(temp_dir.path()).unwrap();

        assert_eq!(
            svgs,
            vec![
                temp_dir.path().join("a_flamegraph.svg"),
                temp_dir.path().join("b_flamegraph.svg"),
            ]
        );
    }

    #[test]
    fn test_list_flamegraphs_missing_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let svgs = list_flamegraphs(temp_dir.path().join("nope")).unwrap();
        assert!(svgs.is_empty());
    }
}
