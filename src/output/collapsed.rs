//! Collapsed stack file writer.
//!
//! One line per distinct stack: `frame1;frame2;...;frameN count`,
//! sorted by descending count.

use crate::aggregator::StackCountTable;
use crate::utils::error::OutputError;
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write a stack count table in collapsed format
///
/// **Public** - main entry point for collapsed output
///
/// # Returns
/// Number of lines written
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::InvalidPath` - Path is invalid
pub fn write_collapsed(
    table: &StackCountTable,
    output_path: impl AsRef<Path>,
) -> Result<usize, OutputError> {
    let output_path = output_path.as_ref();

    super::prepare_output_path(output_path, "txt")?;

    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);

    let mut written = 0;
    for stack in table.sorted() {
        if stack.stack.is_empty() {
            continue;
        }
        writeln!(writer, "{}", stack.to_line())?;
        written += 1;
    }

    writer.flush()?;

    info!(
        "  Created {} with {} unique stacks",
        output_path.display(),
        table.len()
    );

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::fold_stacks;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_writes_sorted_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app_collapsed.txt");
        let table = fold_stacks("a\nb\n---\nc\n---\nc\n---\n", "jdk.ExecutionSample");

        let written = write_collapsed(&table, &path).unwrap();

        assert_eq!(written, 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "c 2\nb;a 1\n");
    }

    #[test]
    fn test_empty_table_writes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty_collapsed.txt");

        write_collapsed(&StackCountTable::new(), &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = write_collapsed(&StackCountTable::new(), dir.path());
        assert!(matches!(result, Err(OutputError::InvalidPath(_))));
    }
}
