//! Destination adapters and the registry that picks one.
//!
//! This module provides:
//! - `OutputAdapter`: The capability every destination implements
//! - `Preparation`: An adapter's optional one-time initialization
//! - `Destination`, `AdapterFactory`, `AdapterRegistry`: Resolution from the
//!   `output` option to a constructed adapter
//! - The built-in return, console, folder and document-server adapters

use std::fmt::Debug;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::error::AdapterError;

mod console;
mod folder;
mod registry;
mod returning;
mod server;

pub use console::ConsoleAdapter;
pub use folder::FolderAdapter;
pub use registry::{AdapterFactory, AdapterRegistry, Destination, OUTPUT_TYPES, is_server};
pub use returning::ReturnAdapter;
pub use server::{
    Connection, Document, DocumentStore, InMemoryDocumentStore, ServerAdapter, ServerKind,
};

/// Initialization an adapter needs before it can accept payloads.
pub enum Preparation<'a> {
    /// Nothing to do; the adapter is usable right away
    Ready,
    /// Await this once before the first payload is delivered
    Pending(BoxFuture<'a, Result<(), AdapterError>>),
}

impl Debug for Preparation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Preparation::Ready => write!(f, "Ready"),
            Preparation::Pending(_) => write!(f, "Pending(..)"),
        }
    }
}

/// A destination-specific implementation of the output capability.
#[async_trait]
pub trait OutputAdapter: Send + Sync + Debug {
    /// Identifier of the destination, used in errors and logs.
    fn id(&self) -> &str;

    /// One-time initialization; the engine awaits it at most once.
    fn prepare(&self) -> Preparation<'_> {
        Preparation::Ready
    }

    /// Deliver one payload.
    async fn output(&self, data: &Value) -> Result<(), AdapterError>;

    /// Payloads kept in memory, for adapters that keep them.
    fn returned(&self) -> Option<Vec<Value>> {
        None
    }
}

/// Split a payload into records: arrays yield their items, anything else is
/// a single record.
pub(crate) fn records(data: &Value) -> Vec<&Value> {
    match data {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

/// Group records into units of at most `limit`; zero means one unit.
pub(crate) fn batches<T>(items: &[T], limit: usize) -> std::slice::Chunks<'_, T> {
    items.chunks(if limit == 0 { items.len().max(1) } else { limit })
}
