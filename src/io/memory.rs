//! In-memory sink for testing.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::ByteSink;

/// In-memory byte sink; clones share the same buffer.
#[derive(Debug, Clone)]
pub struct MemorySink {
    id: String,
    chunks: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MemorySink {
    /// Create a new empty in-memory sink.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            chunks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every chunk written so far, in write order.
    pub fn chunks(&self) -> Vec<Vec<u8>> {
        self.lock().clone()
    }

    /// All chunks concatenated as a string.
    pub fn contents_string(&self) -> String {
        let joined: Vec<u8> = self.lock().concat();
        String::from_utf8_lossy(&joined).into_owned()
    }

    /// Clear the sink contents.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Vec<u8>>> {
        // a poisoned buffer is still a valid buffer
        self.chunks.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ByteSink for MemorySink {
    fn id(&self) -> &str {
        &self.id
    }

    async fn write_chunk(&self, bytes: &[u8]) -> std::io::Result<()> {
        self.lock().push(bytes.to_vec());
        Ok(())
    }
}
