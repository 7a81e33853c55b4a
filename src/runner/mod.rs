//! Execution of the external dump and renderer programs.

pub mod process;

pub use process::{Invocation, ProcessOutput, ProcessRunner, SystemRunner};
