use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use super::OutputAdapter;
use crate::config::{BaseOptions, OutputOptions};
use crate::error::AdapterError;

/// Keeps every payload in memory so the caller can take it back.
#[derive(Debug, Default)]
pub struct ReturnAdapter {
    values: Mutex<Vec<Value>>,
}

impl ReturnAdapter {
    pub fn new(_base: &BaseOptions, _options: &OutputOptions) -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Value>> {
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl OutputAdapter for ReturnAdapter {
    fn id(&self) -> &str {
        "return"
    }

    async fn output(&self, data: &Value) -> Result<(), AdapterError> {
        self.lock().push(data.clone());
        Ok(())
    }

    fn returned(&self) -> Option<Vec<Value>> {
        Some(self.lock().clone())
    }
}
