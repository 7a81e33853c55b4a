//! Blocking subprocess execution with captured output.
//!
//! The dump tool and the renderer are both driven through [`ProcessRunner`],
//! so the pipeline can be exercised without either program installed.

use crate::utils::error::RunnerError;
use log::{debug, warn};
use std::fmt;
use std::io::{self, Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How often a child with a deadline is polled for exit
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A single program invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,

    /// Bytes fed to the child's stdin (None = stdin closed)
    pub stdin: Option<Vec<u8>>,

    /// Kill the child if it runs longer than this
    pub timeout: Option<Duration>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn stdin(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a finished child
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, None when terminated by a signal
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    pub fn status_description(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {code}"),
            None => "signal".to_owned(),
        }
    }
}

/// Runs external programs to completion
pub trait ProcessRunner {
    fn run(&self, invocation: &Invocation) -> Result<ProcessOutput, RunnerError>;
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn run(&self, invocation: &Invocation) -> Result<ProcessOutput, RunnerError> {
        (**self).run(invocation)
    }
}

/// [`ProcessRunner`] backed by `std::process::Command`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<ProcessOutput, RunnerError> {
        let program = invocation.program.clone();
        let io_err = |source: io::Error| RunnerError::Io {
            program: program.clone(),
            source,
        };

        debug!("Running: {}", invocation);

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(if invocation.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        // stdin is fed from its own thread so a child that fills its stdout
        // pipe before draining stdin cannot deadlock us
        let writer = match (child.stdin.take(), invocation.stdin.clone()) {
            (Some(mut pipe), Some(input)) => Some(thread::spawn(move || pipe.write_all(&input))),
            _ => None,
        };
        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        let status = match invocation.timeout {
            Some(timeout) => match wait_with_deadline(&mut child, timeout) {
                Ok(Some(status)) => status,
                Ok(None) => {
                    warn!("Killing `{}` after {:?}", invocation.program, timeout);
                    terminate(&mut child);
                    return Err(RunnerError::TimedOut {
                        program: invocation.program.clone(),
                        timeout,
                    });
                }
                Err(e) => {
                    terminate(&mut child);
                    return Err(io_err(e));
                }
            },
            None => child.wait().map_err(io_err)?,
        };

        if let Some(writer) = writer {
            match join(writer) {
                // The child is allowed to exit without reading all of its input
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                    debug!("`{}` closed stdin early", invocation.program);
                }
                other => other.map_err(io_err)?,
            }
        }

        let output = ProcessOutput {
            code: status.code(),
            stdout: join(stdout).map_err(io_err)?,
            stderr: join(stderr).map_err(io_err)?,
        };

        debug!(
            "`{}` finished with {} ({} bytes stdout, {} bytes stderr)",
            invocation.program,
            output.status_description(),
            output.stdout.len(),
            output.stderr.len()
        );

        Ok(output)
    }
}

fn spawn_reader<R>(pipe: Option<R>) -> JoinHandle<io::Result<Vec<u8>>>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn join<T>(handle: JoinHandle<io::Result<T>>) -> io::Result<T> {
    handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("pipe thread panicked")))
}

/// Kill the child and reap it so no process outlives a failed run
fn terminate(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Returns None if the child is still running at the deadline
fn wait_with_deadline(child: &mut Child, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_captures_stdout_and_exit_code() {
        let output = SystemRunner::new()
            .run(&Invocation::new("sh").args(["-c", "echo out; echo err >&2; exit 3"]))
            .unwrap();

        assert_eq!(output.stdout_text(), "out\n");
        assert_eq!(output.stderr_text(), "err\n");
        assert_eq!(output.code, Some(3));
        assert!(!output.success());
        assert_eq!(output.status_description(), "exit code 3");
    }

    #[test]
    fn test_feeds_stdin() {
        let output = SystemRunner::new()
            .run(&Invocation::new("cat").stdin("a;b 2\n"))
            .unwrap();

        assert!(output.success());
        assert_eq!(output.stdout_text(), "a;b 2\n");
    }

    #[test]
    fn test_large_stdin_does_not_deadlock() {
        let input = "frame;frame;frame 1\n".repeat(50_000);
        let output = SystemRunner::new()
            .run(&Invocation::new("cat").stdin(input.clone()))
            .unwrap();

        assert_eq!(output.stdout.len(), input.len());
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let result = SystemRunner::new().run(&Invocation::new("definitely-not-a-real-tool-9f2c"));
        assert!(matches!(result, Err(RunnerError::Spawn { .. })));
    }

    #[test]
    fn test_timeout_kills_child() {
        let start = Instant::now();
        let result = SystemRunner::new().run(
            &Invocation::new("sleep")
                .arg("5")
                .timeout(Some(Duration::from_millis(200))),
        );

        assert!(matches!(result, Err(RunnerError::TimedOut { .. })));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_terminate_reaps_running_child() {
        let mut child = Command::new("sleep").arg("5").spawn().unwrap();

        terminate(&mut child);

        assert!(child.try_wait().unwrap().is_some());
    }

    #[test]
    fn test_invocation_display() {
        let invocation = Invocation::new("jfr").args(["print", "--events", "x"]);
        assert_eq!(invocation.to_string(), "jfr print --events x");
    }
}
