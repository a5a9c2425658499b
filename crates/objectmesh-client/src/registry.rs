//! Backend connection registry
//!
//! Single source of truth for "do we have a way to talk to backend X
//! right now". Entries are either absent or cached; once cached, a
//! connection is trusted until [`BackendRegistry::close_all`]. On a miss
//! the registry refreshes itself from a full backend-record scan rather
//! than a point lookup: backend records change rarely relative to lookup
//! frequency, so one scan discovers every new backend at once.

use crate::transport::{BackendConnection, BackendTransport};
use objectmesh_common::{BackendId, Error, Result};
use objectmesh_metadata::MetadataSource;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Cache of live backend connections, keyed by backend id
pub struct BackendRegistry<T: BackendTransport, M: MetadataSource> {
    transport: T,
    metadata: Arc<M>,
    conns: RwLock<HashMap<BackendId, T::Conn>>,
}

impl<T: BackendTransport, M: MetadataSource> BackendRegistry<T, M> {
    /// Create an empty registry
    pub fn new(transport: T, metadata: Arc<M>) -> Self {
        Self {
            transport,
            metadata,
            conns: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve a live connection to the given backend.
    ///
    /// Cache hit returns immediately. On a miss the registry enumerates
    /// all backend records, connects every backend not yet cached, and
    /// re-checks once; a backend still absent after that does not exist
    /// in the store's current view and resolution fails with
    /// `UnknownBackend`. The write lock is held across the refresh, so
    /// concurrent misses coalesce into a single scan and at most one
    /// connection exists per backend id.
    pub async fn resolve(&self, backend_id: BackendId) -> Result<T::Conn> {
        if let Some(conn) = self.conns.read().await.get(&backend_id) {
            return Ok(conn.clone());
        }

        let mut conns = self.conns.write().await;
        // Double-check: another task may have refreshed while we waited
        if let Some(conn) = conns.get(&backend_id) {
            return Ok(conn.clone());
        }

        debug!(%backend_id, "backend not cached, refreshing registry");
        let records = self.metadata.backend_records().await?;
        for (id, record) in &records {
            if !conns.contains_key(id) {
                let conn = self.transport.connect(record).await?;
                conns.insert(*id, conn);
                info!(backend_id = %id, host = %record.host, port = record.port, "registered backend");
            }
        }

        conns
            .get(&backend_id)
            .cloned()
            .ok_or(Error::UnknownBackend(backend_id))
    }

    /// Backend ids currently cached
    pub async fn cached_backends(&self) -> Vec<BackendId> {
        self.conns.read().await.keys().copied().collect()
    }

    /// Number of cached connections
    pub async fn len(&self) -> usize {
        self.conns.read().await.len()
    }

    /// Whether the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.conns.read().await.is_empty()
    }

    /// Close every cached connection, in no particular order.
    ///
    /// Drain semantics: every endpoint gets a close attempt regardless of
    /// earlier failures. Returns the collected failures; an empty vector
    /// means a clean shutdown.
    pub async fn close_all(&self) -> Vec<(BackendId, Error)> {
        let drained: Vec<(BackendId, T::Conn)> =
            self.conns.write().await.drain().collect();
        let closes = drained.into_iter().map(|(id, conn)| async move {
            let result = conn.close().await;
            (id, result)
        });

        let mut failures = Vec::new();
        for (id, result) in futures::future::join_all(closes).await {
            if let Err(e) = result {
                warn!(backend_id = %id, error = %e, "failed to close backend connection");
                failures.push((id, e));
            }
        }
        failures
    }
}
