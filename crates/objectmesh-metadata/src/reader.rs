//! Typed record reads over the key/value boundary
//!
//! [`RecordReader`] decodes the JSON record shapes out of the raw store.
//! A malformed backend record aborts the whole enumeration instead of
//! being skipped: a registry built from a scan with holes would later
//! report `UnknownBackend` for a backend that actually exists.

use crate::kv::KvStore;
use async_trait::async_trait;
use objectmesh_common::{BackendId, BackendRecord, Error, ObjectId, ObjectRecord, Result};
use objectmesh_common::BACKEND_KEY_PREFIX;
use std::collections::HashMap;

/// Read path into the object and backend records of the metadata store
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetch the record for one object
    async fn object_record(&self, object_id: ObjectId) -> Result<ObjectRecord>;

    /// Enumerate all known backend records, keyed by backend id
    async fn backend_records(&self) -> Result<HashMap<BackendId, BackendRecord>>;

    /// Release the store connection held by this source
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// [`MetadataSource`] implementation over any [`KvStore`]
pub struct RecordReader<S> {
    store: S,
}

impl<S: KvStore> RecordReader<S> {
    /// Create a reader over the given store
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the underlying store
    pub const fn store(&self) -> &S {
        &self.store
    }
}

#[async_trait]
impl<S: KvStore> MetadataSource for RecordReader<S> {
    async fn object_record(&self, object_id: ObjectId) -> Result<ObjectRecord> {
        let key = ObjectRecord::key_for(object_id);
        let value = self
            .store
            .get(&key)
            .await?
            .ok_or(Error::NotFound(object_id))?;
        serde_json::from_str(&value).map_err(|e| Error::decode(key, e.to_string()))
    }

    async fn backend_records(&self) -> Result<HashMap<BackendId, BackendRecord>> {
        let entries = self.store.scan(BACKEND_KEY_PREFIX).await?;
        let mut records = HashMap::with_capacity(entries.len());
        for (key, value) in entries {
            let record: BackendRecord =
                serde_json::from_str(&value).map_err(|e| Error::decode(key, e.to_string()))?;
            records.insert(record.id, record);
        }
        Ok(records)
    }

    async fn close(&self) -> Result<()> {
        self.store.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKvStore;
    use objectmesh_common::PlatformId;

    fn object_record(master: Option<BackendId>) -> ObjectRecord {
        ObjectRecord {
            id: ObjectId::new(),
            dataset_name: None,
            class_name: "model.Matrix".to_string(),
            master_backend_id: master,
            replica_backend_ids: vec![BackendId::new()],
            is_read_only: false,
            original_object_id: None,
            version_object_ids: Vec::new(),
        }
    }

    fn backend_record(host: &str) -> BackendRecord {
        BackendRecord {
            id: BackendId::new(),
            host: host.to_string(),
            port: 6867,
            owner_id: PlatformId::new(),
        }
    }

    async fn reader_with(
        objects: &[ObjectRecord],
        backends: &[BackendRecord],
    ) -> RecordReader<MemoryKvStore> {
        let store = MemoryKvStore::new();
        for record in objects {
            store
                .insert(record.key(), serde_json::to_string(record).unwrap())
                .await;
        }
        for record in backends {
            store
                .insert(record.key(), serde_json::to_string(record).unwrap())
                .await;
        }
        RecordReader::new(store)
    }

    #[tokio::test]
    async fn test_object_record_round_trip() {
        let record = object_record(Some(BackendId::new()));
        let reader = reader_with(std::slice::from_ref(&record), &[]).await;

        let fetched = reader.object_record(record.id).await.unwrap();
        assert_eq!(fetched, record);
    }

    #[tokio::test]
    async fn test_object_record_not_found() {
        let reader = reader_with(&[], &[]).await;
        let missing = ObjectId::new();

        let err = reader.object_record(missing).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn test_object_record_decode_error() {
        let store = MemoryKvStore::new();
        let object_id = ObjectId::new();
        store
            .insert(ObjectRecord::key_for(object_id), "{not json")
            .await;
        let reader = RecordReader::new(store);

        let err = reader.object_record(object_id).await.unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[tokio::test]
    async fn test_backend_records_enumeration() {
        let backends = [backend_record("node-1"), backend_record("node-2")];
        let reader = reader_with(&[], &backends).await;

        let records = reader.backend_records().await.unwrap();
        assert_eq!(records.len(), 2);
        for backend in &backends {
            assert_eq!(records.get(&backend.id), Some(backend));
        }
    }

    #[tokio::test]
    async fn test_backend_scan_aborts_on_malformed_record() {
        let backend = backend_record("node-1");
        let reader = reader_with(&[], &[backend]).await;
        reader
            .store()
            .insert(BackendRecord::key_for(BackendId::new()), "{broken")
            .await;

        // One bad row fails the whole enumeration; no registry with holes.
        let err = reader.backend_records().await.unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[tokio::test]
    async fn test_backend_scan_ignores_object_keys() {
        let record = object_record(None);
        let reader = reader_with(&[record], &[backend_record("node-1")]).await;

        let records = reader.backend_records().await.unwrap();
        assert_eq!(records.len(), 1);
    }
}
