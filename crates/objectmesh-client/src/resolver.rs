//! Object location and lifecycle resolution
//!
//! Every public operation follows the same shape: fetch metadata, resolve
//! a connection to the master backend, forward exactly one remote call,
//! translate the result. The structured [`ObjectDescriptor`] is the
//! primary input; the `*_for` overloads accept a raw object id and fetch
//! the record first.

use crate::grpc::GrpcTransport;
use crate::registry::BackendRegistry;
use crate::transport::{BackendConnection, BackendTransport};
use objectmesh_common::{
    BackendId, ClientConfig, Error, ObjectDescriptor, ObjectId, ObjectRecord, Result,
};
use objectmesh_metadata::{MetadataSource, RecordReader, RedisKvStore};
use std::sync::Arc;
use tracing::{info, warn};

/// Client facade over the registry and the metadata read path
pub struct ObjectClient<T: BackendTransport, M: MetadataSource> {
    metadata: Arc<M>,
    registry: BackendRegistry<T, M>,
}

/// The production client: gRPC transport, Redis-backed metadata
pub type Client = ObjectClient<GrpcTransport, RecordReader<RedisKvStore>>;

impl Client {
    /// Connect to the platform described by `config`
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let store = RedisKvStore::connect(&config.metadata.url).await?;
        let metadata = Arc::new(RecordReader::new(store));
        let transport = GrpcTransport::new(config.rpc);
        info!(url = %config.metadata.url, "objectmesh client initialized");
        Ok(Self::new(transport, metadata))
    }
}

impl<T: BackendTransport, M: MetadataSource> ObjectClient<T, M> {
    /// Build a client from an already-constructed transport and metadata
    /// source
    pub fn new(transport: T, metadata: Arc<M>) -> Self {
        Self {
            registry: BackendRegistry::new(transport, metadata.clone()),
            metadata,
        }
    }

    /// The connection registry backing this client
    pub const fn registry(&self) -> &BackendRegistry<T, M> {
        &self.registry
    }

    /// Fetch the metadata record of an object
    pub async fn object_record(&self, object_id: ObjectId) -> Result<ObjectRecord> {
        self.metadata.object_record(object_id).await
    }

    /// All backends holding a copy of the object: the replica backends in
    /// their stored order, then the master backend last. The master is
    /// always present, even when there are no replicas.
    pub async fn locations(&self, object_id: ObjectId) -> Result<Vec<BackendId>> {
        let record = self
            .metadata
            .object_record(object_id)
            .await
            .map_err(|e| Error::resolution(object_id, e))?;
        let master = record.master_backend_id.ok_or_else(|| {
            Error::resolution(
                object_id,
                Error::invalid_argument("object record has no master backend"),
            )
        })?;
        let mut locations = record.replica_backend_ids;
        locations.push(master);
        Ok(locations)
    }

    /// Create a new version of the object on its master backend and
    /// return the descriptor of the version.
    ///
    /// `preserve_source` and `dest_host` are accepted for interface
    /// compatibility and currently have no effect: the source object is
    /// always preserved and the backend picks the version's location.
    pub async fn new_version(
        &self,
        descriptor: &ObjectDescriptor,
        preserve_source: bool,
        dest_host: Option<&str>,
    ) -> Result<ObjectDescriptor> {
        if preserve_source {
            warn!(object_id = %descriptor.object_id, "preserve_source is ignored: the source object is always preserved");
        }
        if let Some(host) = dest_host {
            warn!(object_id = %descriptor.object_id, host, "dest_host is ignored: the backend chooses the version location");
        }
        let conn = self.registry.resolve(descriptor.master_backend_id).await?;
        conn.new_version(descriptor.object_id).await
    }

    /// Merge a version object back into its original
    pub async fn consolidate_version(&self, descriptor: &ObjectDescriptor) -> Result<()> {
        let conn = self.registry.resolve(descriptor.master_backend_id).await?;
        conn.consolidate_version(descriptor.object_id).await
    }

    /// Replicate the object onto `target`.
    ///
    /// With `recursive` the backend also replicates every object the
    /// replicated one references; with `include_remotes` copies held
    /// outside the local platform instance are included.
    pub async fn new_replica(
        &self,
        descriptor: &ObjectDescriptor,
        target: BackendId,
        recursive: bool,
        include_remotes: bool,
    ) -> Result<()> {
        let conn = self.registry.resolve(descriptor.master_backend_id).await?;
        conn.new_replica(descriptor.object_id, target, recursive, include_remotes)
            .await
    }

    /// Read the serialized properties of the object from its master
    /// backend
    pub async fn object_properties(&self, descriptor: &ObjectDescriptor) -> Result<Vec<u8>> {
        let conn = self.registry.resolve(descriptor.master_backend_id).await?;
        conn.get_properties(descriptor.object_id).await
    }

    /// Replace the serialized properties of the object on its master
    /// backend
    pub async fn update_object_properties(
        &self,
        descriptor: &ObjectDescriptor,
        properties: Vec<u8>,
    ) -> Result<()> {
        let conn = self.registry.resolve(descriptor.master_backend_id).await?;
        conn.update_properties(descriptor.object_id, properties)
            .await
    }

    /// Build the descriptor of an object from its stored record
    pub async fn descriptor_for(&self, object_id: ObjectId) -> Result<ObjectDescriptor> {
        let record = self
            .metadata
            .object_record(object_id)
            .await
            .map_err(|e| Error::resolution(object_id, e))?;
        ObjectDescriptor::try_from(&record)
    }

    /// [`Self::new_version`] keyed off a raw object id
    pub async fn new_version_for(
        &self,
        object_id: ObjectId,
        preserve_source: bool,
        dest_host: Option<&str>,
    ) -> Result<ObjectDescriptor> {
        let descriptor = self.descriptor_for(object_id).await?;
        self.new_version(&descriptor, preserve_source, dest_host)
            .await
    }

    /// [`Self::consolidate_version`] keyed off a raw object id
    pub async fn consolidate_version_for(&self, object_id: ObjectId) -> Result<()> {
        let descriptor = self.descriptor_for(object_id).await?;
        self.consolidate_version(&descriptor).await
    }

    /// [`Self::new_replica`] keyed off a raw object id
    pub async fn new_replica_for(
        &self,
        object_id: ObjectId,
        target: BackendId,
        recursive: bool,
        include_remotes: bool,
    ) -> Result<()> {
        let descriptor = self.descriptor_for(object_id).await?;
        self.new_replica(&descriptor, target, recursive, include_remotes)
            .await
    }

    /// Shut the client down: close every cached backend connection, then
    /// the metadata store connection.
    ///
    /// Every endpoint gets a close attempt; individual failures are
    /// logged as they happen and summarized in the returned error.
    pub async fn finish(&self) -> Result<()> {
        let failures = self.registry.close_all().await;
        let store_result = self.metadata.close().await;

        if let Some((backend_id, _)) = failures.first() {
            return Err(Error::remote_call(
                *backend_id,
                "close",
                format!("{} backend connection(s) failed to close", failures.len()),
            ));
        }
        store_result
    }
}
