//! Async byte sink trait definition.

use std::fmt::Debug;

use async_trait::async_trait;

/// Trait for asynchronous byte destinations.
///
/// Each call to `write_chunk` delivers one complete rendered payload.
#[async_trait]
pub trait ByteSink: Send + Sync + Debug {
    /// Returns a unique identifier for this sink.
    ///
    /// This is used for error messages and logging.
    /// Convention: "-" for stdout, file path for files.
    fn id(&self) -> &str;

    /// Write a whole chunk and flush it.
    async fn write_chunk(&self, bytes: &[u8]) -> std::io::Result<()>;
}
