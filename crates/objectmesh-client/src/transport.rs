//! Backend transport boundary
//!
//! The registry and resolver talk to backends through these traits so the
//! caching and resolution logic is testable without live backends. The
//! production implementation is [`crate::grpc::GrpcTransport`].

use async_trait::async_trait;
use objectmesh_common::{BackendId, BackendRecord, ObjectDescriptor, ObjectId, Result};

/// A live connection to one backend node.
///
/// Connections are cheap to clone; clones share the underlying channel.
/// None of these calls is retried by this layer: a transport failure
/// surfaces as `RemoteCall` and the caller decides whether a retry is
/// safe.
#[async_trait]
pub trait BackendConnection: Clone + Send + Sync + 'static {
    /// Request a new mutable version of the object; returns the descriptor
    /// of the new version as reported by the backend
    async fn new_version(&self, object_id: ObjectId) -> Result<ObjectDescriptor>;

    /// Merge a version back into its original object
    async fn consolidate_version(&self, object_id: ObjectId) -> Result<()>;

    /// Instruct the backend to replicate the object onto `target`
    async fn new_replica(
        &self,
        object_id: ObjectId,
        target: BackendId,
        recursive: bool,
        include_remotes: bool,
    ) -> Result<()>;

    /// Read the serialized properties of an object
    async fn get_properties(&self, object_id: ObjectId) -> Result<Vec<u8>>;

    /// Replace the serialized properties of an object
    async fn update_properties(&self, object_id: ObjectId, properties: Vec<u8>) -> Result<()>;

    /// Release the connection; safe to call repeatedly
    async fn close(&self) -> Result<()>;
}

/// Factory for backend connections, bound to the transport configuration
#[async_trait]
pub trait BackendTransport: Send + Sync + 'static {
    /// The connection type this transport produces
    type Conn: BackendConnection;

    /// Open a connection to the backend described by `record`
    async fn connect(&self, record: &BackendRecord) -> Result<Self::Conn>;
}
