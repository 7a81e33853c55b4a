//! Extraction of stack samples from JFR recordings via the external dump tool.

pub mod invoker;

pub use invoker::{dump_recording, DumpRequest};
