//! Document-server destinations (couchbase, sync-gateway).
//!
//! The wire client lives behind `DocumentStore`; `InMemoryDocumentStore` is
//! the store used when none is supplied.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{OutputAdapter, Preparation, batches, records};
use crate::config::{BaseOptions, OutputOptions};
use crate::error::AdapterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerKind {
    Couchbase,
    SyncGateway,
}

impl ServerKind {
    pub fn name(&self) -> &'static str {
        match self {
            ServerKind::Couchbase => "couchbase",
            ServerKind::SyncGateway => "sync-gateway",
        }
    }
}

/// Connection parameters taken from the output options.
#[derive(Clone, PartialEq, Eq)]
pub struct Connection {
    pub kind: ServerKind,
    pub server: String,
    pub bucket: String,
    pub username: String,
    pub password: String,
}

impl Connection {
    pub fn from_options(kind: ServerKind, options: &OutputOptions) -> Self {
        Self {
            kind,
            server: options.server().to_string(),
            bucket: options.bucket().to_string(),
            username: options.username().to_string(),
            password: options.password().to_string(),
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("kind", &self.kind)
            .field("server", &self.server)
            .field("bucket", &self.bucket)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A keyed document ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub body: Value,
}

/// Client side of a document database.
#[async_trait]
pub trait DocumentStore: Send + Sync + fmt::Debug {
    /// Open (or verify) a connection to the bucket.
    async fn connect(&self, connection: &Connection) -> Result<(), AdapterError>;

    /// Insert or replace a batch of documents.
    async fn upsert(
        &self,
        connection: &Connection,
        documents: Vec<Document>,
    ) -> Result<(), AdapterError>;
}

#[derive(Debug, Default)]
struct StoreState {
    connects: usize,
    connected: HashSet<(String, String)>,
    buckets: HashMap<String, BTreeMap<String, Value>>,
}

/// Document store kept in process memory.
///
/// It enforces what a real server would: every connection field must be set,
/// and writes need a prior `connect` to the same server and bucket.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    state: Mutex<StoreState>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `connect` calls.
    pub fn connect_count(&self) -> usize {
        self.lock().connects
    }

    /// Snapshot of one bucket, keyed by document id.
    pub fn documents(&self, bucket: &str) -> BTreeMap<String, Value> {
        self.lock().buckets.get(bucket).cloned().unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn connect(&self, connection: &Connection) -> Result<(), AdapterError> {
        let missing = [
            ("server", &connection.server),
            ("bucket", &connection.bucket),
            ("username", &connection.username),
            ("password", &connection.password),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect::<Vec<_>>();

        if !missing.is_empty() {
            return Err(AdapterError::Connection {
                server: connection.server.clone(),
                reason: format!("missing {}", missing.join(", ")),
            });
        }

        let mut state = self.lock();
        state.connects += 1;
        state
            .connected
            .insert((connection.server.clone(), connection.bucket.clone()));
        Ok(())
    }

    async fn upsert(
        &self,
        connection: &Connection,
        documents: Vec<Document>,
    ) -> Result<(), AdapterError> {
        let mut state = self.lock();
        let key = (connection.server.clone(), connection.bucket.clone());
        if !state.connected.contains(&key) {
            return Err(AdapterError::Store(format!(
                "not connected to bucket '{}' on {}",
                connection.bucket, connection.server
            )));
        }
        let bucket = state.buckets.entry(connection.bucket.clone()).or_default();
        for doc in documents {
            bucket.insert(doc.id, doc.body);
        }
        Ok(())
    }
}

/// Stores payload records as documents, `limit` documents per request.
#[derive(Debug)]
pub struct ServerAdapter {
    connection: Connection,
    limit: usize,
    store: Arc<dyn DocumentStore>,
    next: AtomicUsize,
}

impl ServerAdapter {
    pub fn new(
        kind: ServerKind,
        store: Arc<dyn DocumentStore>,
        _base: &BaseOptions,
        options: &OutputOptions,
    ) -> Self {
        Self {
            connection: Connection::from_options(kind, options),
            limit: options.limit(),
            store,
            next: AtomicUsize::new(0),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Key a record by its `_id` or `id` field, or by a generated sequence.
    fn document(&self, record: &Value) -> Document {
        let id = ["_id", "id"]
            .iter()
            .find_map(|key| match record.get(key) {
                Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            })
            .unwrap_or_else(|| {
                let seq = self.next.fetch_add(1, Ordering::Relaxed);
                format!("{}::{seq}", self.connection.bucket)
            });
        Document {
            id,
            body: record.clone(),
        }
    }
}

#[async_trait]
impl OutputAdapter for ServerAdapter {
    fn id(&self) -> &str {
        self.connection.kind.name()
    }

    fn prepare(&self) -> Preparation<'_> {
        Preparation::Pending(self.store.connect(&self.connection))
    }

    async fn output(&self, data: &Value) -> Result<(), AdapterError> {
        let documents: Vec<Document> = records(data)
            .into_iter()
            .map(|record| self.document(record))
            .collect();

        for batch in batches(&documents, self.limit) {
            debug!(
                server = %self.connection.server,
                bucket = %self.connection.bucket,
                count = batch.len(),
                "upserting documents"
            );
            self.store.upsert(&self.connection, batch.to_vec()).await?;
        }
        Ok(())
    }
}
