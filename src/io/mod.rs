//! Byte sinks used by the console and folder adapters.
//!
//! This module provides:
//! - `ByteSink`: Trait for async destinations that accept rendered bytes
//! - `StdoutSink` and `FileSink` for the process console and the filesystem
//! - `MemorySink`, an in-memory implementation for testing

mod memory;
mod sink;
mod std_io;

pub use memory::MemorySink;
pub use sink::ByteSink;
pub use std_io::{FileSink, StdoutSink};
