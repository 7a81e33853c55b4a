//! Runs the JFR dump tool against a recording and captures its text output.

use crate::runner::{Invocation, ProcessRunner};
use crate::utils::error::DumpError;
use log::{debug, info};
use std::path::Path;
use std::time::Duration;

/// Parameters for one dump invocation
#[derive(Debug, Clone)]
pub struct DumpRequest<'a> {
    /// Dump tool program (usually `jfr`)
    pub tool: &'a str,
    pub recording: &'a Path,
    pub event_type: &'a str,
    pub stack_depth: u32,
    pub timeout: Option<Duration>,
}

impl DumpRequest<'_> {
    /// `<tool> print --events <event> --stack-depth <depth> <recording>`
    pub fn to_invocation(&self) -> Invocation {
        Invocation::new(self.tool)
            .args([
                "print".to_string(),
                "--events".to_string(),
                self.event_type.to_string(),
                "--stack-depth".to_string(),
                self.stack_depth.to_string(),
                self.recording.display().to_string(),
            ])
            .timeout(self.timeout)
    }
}

/// Dump a recording and return the tool's stdout as text
///
/// # Errors
/// * `DumpError::ToolFailed` - non-zero exit, carries captured stdout/stderr
/// * `DumpError::Runner` - the tool could not be started, timed out, or I/O failed
pub fn dump_recording<R: ProcessRunner>(
    runner: &R,
    request: &DumpRequest<'_>,
) -> Result<String, DumpError> {
    info!("Converting {} to collapsed format...", request.recording.display());

    let output = runner.run(&request.to_invocation())?;

    if !output.success() {
        return Err(DumpError::ToolFailed {
            status: output.status_description(),
            stdout: output.stdout_text(),
            stderr: output.stderr_text(),
        });
    }

    let text = output.stdout_text();
    debug!("Dump produced {} lines", text.lines().count());

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ProcessOutput;
    use crate::utils::error::RunnerError;
    use std::cell::RefCell;

    struct CannedRunner {
        output: ProcessOutput,
        seen: RefCell<Vec<Invocation>>,
    }

    impl ProcessRunner for CannedRunner {
        fn run(&self, invocation: &Invocation) -> Result<ProcessOutput, RunnerError> {
            self.seen.borrow_mut().push(invocation.clone());
            Ok(self.output.clone())
        }
    }

    fn request(recording: &Path) -> DumpRequest<'_> {
        DumpRequest {
            tool: "jfr",
            recording,
            event_type: "jdk.ExecutionSample",
            stack_depth: 999,
            timeout: None,
        }
    }

    #[test]
    fn test_builds_print_command() {
        let invocation = request(Path::new("/tmp/app.jfr")).to_invocation();

        assert_eq!(invocation.program, "jfr");
        assert_eq!(
            invocation.args,
            vec![
                "print",
                "--events",
                "jdk.ExecutionSample",
                "--stack-depth",
                "999",
                "/tmp/app.jfr"
            ]
        );
        assert!(invocation.stdin.is_none());
    }

    #[test]
    fn test_returns_stdout_on_success() {
        let runner = CannedRunner {
            output: ProcessOutput {
                code: Some(0),
                stdout: b"frameA\n---\n".to_vec(),
                stderr: Vec::new(),
            },
            seen: RefCell::new(Vec::new()),
        };

        let text = dump_recording(&runner, &request(Path::new("app.jfr"))).unwrap();

        assert_eq!(text, "frameA\n---\n");
        assert_eq!(runner.seen.borrow().len(), 1);
    }

    #[test]
    fn test_non_zero_exit_carries_streams() {
        let runner = CannedRunner {
            output: ProcessOutput {
                code: Some(1),
                stdout: b"partial".to_vec(),
                stderr: b"jfr: file is not a recording".to_vec(),
            },
            seen: RefCell::new(Vec::new()),
        };

        match dump_recording(&runner, &request(Path::new("broken.jfr"))) {
            Err(DumpError::ToolFailed {
                status,
                stdout,
                stderr,
            }) => {
                assert_eq!(status, "exit code 1");
                assert_eq!(stdout, "partial");
                assert_eq!(stderr, "jfr: file is not a recording");
            }
            other => panic!("expected ToolFailed, got {:?}", other),
        }
    }
}
