//! Resolution from the `output` option to a constructed adapter.

use std::fmt::{self, Debug};
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use super::{
    ConsoleAdapter, DocumentStore, FolderAdapter, InMemoryDocumentStore, OutputAdapter,
    ReturnAdapter, ServerAdapter, ServerKind,
};
use crate::config::{BaseOptions, OutputOptions};
use crate::error::AdapterError;

/// The named destinations. Any other `output` value is a folder path.
pub const OUTPUT_TYPES: [&str; 4] = ["return", "console", "couchbase", "sync-gateway"];

/// Check if `output` names a server-class destination.
pub fn is_server(output: Option<&str>) -> bool {
    matches!(output, Some("couchbase" | "sync-gateway"))
}

/// Where payloads go.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Destination {
    /// Keep payloads in memory
    Return,
    /// Print payloads to stdout
    Console,
    /// Couchbase bucket
    Couchbase,
    /// Sync Gateway database
    SyncGateway,
    /// Files under a directory
    Folder(PathBuf),
}

impl Destination {
    /// Resolve the `output` option.
    ///
    /// This is a pure function of the value: the four named identifiers map
    /// to their destination, everything else (including an absent or
    /// non-string value) is a folder path.
    pub fn resolve(output: Option<&str>) -> Self {
        match output {
            Some("return") => Destination::Return,
            Some("console") => Destination::Console,
            Some("couchbase") => Destination::Couchbase,
            Some("sync-gateway") => Destination::SyncGateway,
            Some(path) => Destination::Folder(PathBuf::from(path)),
            None => Destination::Folder(PathBuf::new()),
        }
    }

    /// Adapter name: one of the output types, or "folder".
    pub fn name(&self) -> &'static str {
        match self {
            Destination::Return => "return",
            Destination::Console => "console",
            Destination::Couchbase => "couchbase",
            Destination::SyncGateway => "sync-gateway",
            Destination::Folder(_) => "folder",
        }
    }

    /// Check if this destination is backed by a document server.
    pub fn is_server(&self) -> bool {
        matches!(self, Destination::Couchbase | Destination::SyncGateway)
    }

    /// Check if payloads stay inside the process or go to a terminal.
    pub fn is_ephemeral(&self) -> bool {
        matches!(self, Destination::Return | Destination::Console)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Folder(path) => write!(f, "folder:{}", path.display()),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// Builds the adapter for a resolved destination.
pub trait AdapterFactory: Send + Sync + Debug {
    fn create(
        &self,
        destination: &Destination,
        base: &BaseOptions,
        options: &OutputOptions,
    ) -> Result<Box<dyn OutputAdapter>, AdapterError>;
}

/// The built-in adapters.
///
/// Construction is a pure function of the destination and options; the only
/// thing the registry carries is the document store handed to server
/// adapters.
#[derive(Debug, Clone)]
pub struct AdapterRegistry {
    store: Arc<dyn DocumentStore>,
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new(Arc::new(InMemoryDocumentStore::new()))
    }
}

impl AdapterRegistry {
    /// Create a registry whose server adapters talk to `store`.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// The document store used by server adapters.
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }
}

impl AdapterFactory for AdapterRegistry {
    fn create(
        &self,
        destination: &Destination,
        base: &BaseOptions,
        options: &OutputOptions,
    ) -> Result<Box<dyn OutputAdapter>, AdapterError> {
        debug!(destination = %destination, "creating output adapter");
        let adapter: Box<dyn OutputAdapter> = match destination {
            Destination::Return => Box::new(ReturnAdapter::new(base, options)),
            Destination::Console => Box::new(ConsoleAdapter::new(base, options)),
            Destination::Couchbase => Box::new(ServerAdapter::new(
                ServerKind::Couchbase,
                self.store.clone(),
                base,
                options,
            )),
            Destination::SyncGateway => Box::new(ServerAdapter::new(
                ServerKind::SyncGateway,
                self.store.clone(),
                base,
                options,
            )),
            Destination::Folder(path) => Box::new(FolderAdapter::new(path, base, options)),
        };
        Ok(adapter)
    }
}
