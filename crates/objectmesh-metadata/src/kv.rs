//! Key/value store boundary
//!
//! The metadata store is consumed through this minimal read interface:
//! point reads and prefix-scan enumeration. [`MemoryKvStore`] backs tests
//! and embedded setups.

use async_trait::async_trait;
use objectmesh_common::Result;
use std::collections::BTreeMap;
use std::ops::Bound;
use tokio::sync::RwLock;

/// Read interface over the shared metadata store
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Fetch a single value by key; `None` if the key is absent
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Enumerate all `(key, value)` pairs whose key starts with `prefix`
    async fn scan(&self, prefix: &str) -> Result<Vec<(String, String)>>;

    /// Release the underlying store connection; safe to call repeatedly
    async fn close(&self) -> Result<()>;
}

/// In-memory store used by tests and embedded setups
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryKvStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value
    pub async fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.write().await.insert(key.into(), value.into());
    }

    /// Remove a value
    pub async fn remove(&self, key: &str) {
        self.entries.write().await.remove(key);
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn scan(&self, prefix: &str) -> Result<Vec<(String, String)>> {
        let entries = self.entries.read().await;
        Ok(entries
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
