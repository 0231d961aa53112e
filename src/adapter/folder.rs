use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value;
use tracing::debug;

use super::{OutputAdapter, Preparation, batches};
use crate::config::{BaseOptions, OutputOptions};
use crate::error::AdapterError;
use crate::format::{self, FormatKind};
use crate::io::{ByteSink, FileSink};

/// Writes payloads as numbered files under a directory.
///
/// An array payload is split into files of at most `limit` records, and an
/// empty array still becomes one file. Any other payload becomes one file.
#[derive(Debug)]
pub struct FolderAdapter {
    id: String,
    dir: PathBuf,
    format: FormatKind,
    spacing: usize,
    limit: usize,
    next: AtomicUsize,
}

impl FolderAdapter {
    pub fn new(path: &Path, base: &BaseOptions, options: &OutputOptions) -> Self {
        let dir = base.resolve(path);
        Self {
            id: dir.to_string_lossy().into_owned(),
            dir,
            format: options.format(),
            spacing: options.spacing(),
            limit: options.limit(),
            next: AtomicUsize::new(0),
        }
    }

    /// Directory the files are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn write_unit(&self, value: &Value) -> Result<(), AdapterError> {
        let seq = self.next.fetch_add(1, Ordering::Relaxed);
        let path = self
            .dir
            .join(format!("output-{seq:04}.{}", self.format.extension()));
        let bytes = format::serialize(self.format, value, self.spacing)?;
        debug!(path = %path.display(), len = bytes.len(), "writing output file");
        FileSink::new(path).write_chunk(&bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl OutputAdapter for FolderAdapter {
    fn id(&self) -> &str {
        &self.id
    }

    fn prepare(&self) -> Preparation<'_> {
        Preparation::Pending(
            async move {
                tokio::fs::create_dir_all(&self.dir).await?;
                Ok::<(), AdapterError>(())
            }
            .boxed(),
        )
    }

    async fn output(&self, data: &Value) -> Result<(), AdapterError> {
        match data {
            Value::Array(items) if items.is_empty() => self.write_unit(data).await,
            Value::Array(items) => {
                for unit in batches(items, self.limit) {
                    self.write_unit(&Value::Array(unit.to_vec())).await?;
                }
                Ok(())
            }
            other => self.write_unit(other).await,
        }
    }
}
