//! Redis-backed metadata store access
//!
//! Records live as JSON strings under namespaced keys (`/object/{id}`,
//! `/backend/{id}`). Enumeration drives the SCAN cursor with a MATCH
//! pattern until the cursor wraps back to zero, then fetches each key's
//! value. Connectivity failures surface as `StoreUnavailable`.

use crate::kv::KvStore;
use async_trait::async_trait;
use objectmesh_common::{Error, Result};
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::debug;

/// Number of keys requested per SCAN round trip
const SCAN_COUNT: usize = 100;

/// Redis-backed implementation of the store read path
#[derive(Clone)]
pub struct RedisKvStore {
    conn: MultiplexedConnection,
}

impl RedisKvStore {
    /// Connect to the store at the given URL, e.g. `redis://127.0.0.1:6379`
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| Error::store_unavailable(format!("invalid store url {url:?}: {e}")))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| Error::store_unavailable(e.to_string()))?;
        debug!(url, "connected to metadata store");
        Ok(Self { conn })
    }
}

#[async_trait]
impl KvStore for RedisKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        conn.get(key)
            .await
            .map_err(|e| Error::store_unavailable(e.to_string()))
    }

    async fn scan(&self, prefix: &str) -> Result<Vec<(String, String)>> {
        let mut conn = self.conn.clone();
        let pattern = format!("{prefix}*");
        let mut entries = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await
                .map_err(|e| Error::store_unavailable(e.to_string()))?;

            for key in keys {
                let value: Option<String> = conn
                    .get(&key)
                    .await
                    .map_err(|e| Error::store_unavailable(e.to_string()))?;
                // A key may vanish between the scan page and the read
                if let Some(value) = value {
                    entries.push((key, value));
                }
            }

            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        Ok(entries)
    }

    async fn close(&self) -> Result<()> {
        // The multiplexed connection is closed when its last clone drops;
        // there is no explicit teardown to wait on.
        debug!("releasing metadata store connection");
        Ok(())
    }
}
