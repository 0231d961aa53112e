//! Console and file sinks backed by tokio.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use super::ByteSink;

/// Sink writing to the process stdout.
#[derive(Debug, Clone)]
pub struct StdoutSink {
    id: String,
}

impl StdoutSink {
    /// Create a new stdout sink.
    pub fn new() -> Self {
        Self { id: "-".into() }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ByteSink for StdoutSink {
    fn id(&self) -> &str {
        &self.id
    }

    async fn write_chunk(&self, bytes: &[u8]) -> std::io::Result<()> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(bytes).await?;
        stdout.flush().await
    }
}

/// Sink writing to a single file, replacing its content on every chunk.
#[derive(Debug, Clone)]
pub struct FileSink {
    id: String,
    path: PathBuf,
}

impl FileSink {
    /// Create a new file sink.
    pub fn new(path: PathBuf) -> Self {
        let id = path.to_string_lossy().into_owned();
        Self { id, path }
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ByteSink for FileSink {
    fn id(&self) -> &str {
        &self.id
    }

    async fn write_chunk(&self, bytes: &[u8]) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&self.path)
            .await?;
        file.write_all(bytes).await?;
        file.flush().await
    }
}
