//! Test doubles for the transport and metadata seams.

use crate::transport::{BackendConnection, BackendTransport};
use async_trait::async_trait;
use objectmesh_common::{
    BackendId, BackendRecord, Error, ObjectDescriptor, ObjectId, ObjectRecord, PlatformId, Result,
};
use objectmesh_metadata::MetadataSource;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Build a backend record for the given host with a fresh id.
pub fn backend_record(host: &str) -> BackendRecord {
    BackendRecord {
        id: BackendId::new(),
        host: host.to_string(),
        port: 6867,
        owner_id: PlatformId::new(),
    }
}

/// A lifecycle call observed by a [`FakeConnection`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    NewVersion(ObjectId),
    ConsolidateVersion(ObjectId),
    NewReplica(ObjectId, BackendId, bool, bool),
    GetProperties(ObjectId),
    UpdateProperties(ObjectId, Vec<u8>),
}

#[derive(Clone, Debug)]
pub struct FakeConnection {
    pub backend_id: BackendId,
    pub calls: Arc<Mutex<Vec<Call>>>,
    pub closed: Arc<AtomicBool>,
    fail_close: bool,
}

impl FakeConnection {
    pub fn recorded_calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BackendConnection for FakeConnection {
    async fn new_version(&self, object_id: ObjectId) -> Result<ObjectDescriptor> {
        self.calls.lock().unwrap().push(Call::NewVersion(object_id));
        Ok(ObjectDescriptor::new(ObjectId::new(), self.backend_id))
    }

    async fn consolidate_version(&self, object_id: ObjectId) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::ConsolidateVersion(object_id));
        Ok(())
    }

    async fn new_replica(
        &self,
        object_id: ObjectId,
        target: BackendId,
        recursive: bool,
        include_remotes: bool,
    ) -> Result<()> {
        self.calls.lock().unwrap().push(Call::NewReplica(
            object_id,
            target,
            recursive,
            include_remotes,
        ));
        Ok(())
    }

    async fn get_properties(&self, object_id: ObjectId) -> Result<Vec<u8>> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::GetProperties(object_id));
        Ok(Vec::new())
    }

    async fn update_properties(&self, object_id: ObjectId, properties: Vec<u8>) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::UpdateProperties(object_id, properties));
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if self.fail_close {
            return Err(Error::remote_call(self.backend_id, "close", "injected"));
        }
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakeTransport {
    pub connects: Arc<AtomicUsize>,
    connect_delay: Option<Duration>,
    fail_close_for: Option<BackendId>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self {
            connects: Arc::new(AtomicUsize::new(0)),
            connect_delay: None,
            fail_close_for: None,
        }
    }

    /// Slow down connects to widen the race window in concurrency tests.
    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = Some(delay);
        self
    }

    /// Make connections to the given backend fail their close call.
    pub fn with_close_failure(mut self, backend_id: BackendId) -> Self {
        self.fail_close_for = Some(backend_id);
        self
    }
}

#[async_trait]
impl BackendTransport for FakeTransport {
    type Conn = FakeConnection;

    async fn connect(&self, record: &BackendRecord) -> Result<Self::Conn> {
        if let Some(delay) = self.connect_delay {
            tokio::time::sleep(delay).await;
        }
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(FakeConnection {
            backend_id: record.id,
            calls: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(AtomicBool::new(false)),
            fail_close: self.fail_close_for == Some(record.id),
        })
    }
}

pub struct FakeMetadata {
    objects: Mutex<HashMap<ObjectId, ObjectRecord>>,
    backends: Mutex<HashMap<BackendId, BackendRecord>>,
    pub scans: AtomicUsize,
    pub store_down: AtomicBool,
    pub closed: AtomicBool,
}

impl FakeMetadata {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            backends: Mutex::new(HashMap::new()),
            scans: AtomicUsize::new(0),
            store_down: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    pub fn with_backend(self, record: BackendRecord) -> Self {
        self.add_backend(record);
        self
    }

    pub fn with_object(self, record: ObjectRecord) -> Self {
        self.add_object(record);
        self
    }

    pub fn add_backend(&self, record: BackendRecord) {
        self.backends.lock().unwrap().insert(record.id, record);
    }

    pub fn add_object(&self, record: ObjectRecord) {
        self.objects.lock().unwrap().insert(record.id, record);
    }
}

#[async_trait]
impl MetadataSource for FakeMetadata {
    async fn object_record(&self, object_id: ObjectId) -> Result<ObjectRecord> {
        if self.store_down.load(Ordering::SeqCst) {
            return Err(Error::store_unavailable("injected"));
        }
        self.objects
            .lock()
            .unwrap()
            .get(&object_id)
            .cloned()
            .ok_or(Error::NotFound(object_id))
    }

    async fn backend_records(&self) -> Result<HashMap<BackendId, BackendRecord>> {
        if self.store_down.load(Ordering::SeqCst) {
            return Err(Error::store_unavailable("injected"));
        }
        self.scans.fetch_add(1, Ordering::SeqCst);
        Ok(self.backends.lock().unwrap().clone())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
