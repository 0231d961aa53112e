use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::trace;

use super::OutputAdapter;
use crate::config::{BaseOptions, OutputOptions};
use crate::error::AdapterError;
use crate::format::{self, FormatKind};
use crate::io::{ByteSink, StdoutSink};

/// Renders each payload in the configured format and prints it.
#[derive(Debug)]
pub struct ConsoleAdapter {
    format: FormatKind,
    spacing: usize,
    sink: Arc<dyn ByteSink>,
}

impl ConsoleAdapter {
    /// Create a console adapter printing to stdout.
    pub fn new(_base: &BaseOptions, options: &OutputOptions) -> Self {
        Self::with_sink(options, Arc::new(StdoutSink::new()))
    }

    /// Create a console adapter printing to any sink.
    pub fn with_sink(options: &OutputOptions, sink: Arc<dyn ByteSink>) -> Self {
        Self {
            format: options.format(),
            spacing: options.spacing(),
            sink,
        }
    }
}

#[async_trait]
impl OutputAdapter for ConsoleAdapter {
    fn id(&self) -> &str {
        "console"
    }

    async fn output(&self, data: &Value) -> Result<(), AdapterError> {
        let mut bytes = format::serialize(self.format, data, self.spacing)?;
        if bytes.last() != Some(&b'\n') {
            bytes.push(b'\n');
        }
        trace!(sink = self.sink.id(), len = bytes.len(), "printing payload");
        self.sink.write_chunk(&bytes).await?;
        Ok(())
    }
}
