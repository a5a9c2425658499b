//! gRPC backend transport
//!
//! Channels are created lazily: opening a connection never blocks on an
//! unreachable backend, and the actual dial happens on the first call.
//! Every request/response exchange is bounded by the configured call
//! timeout.

use crate::transport::{BackendConnection, BackendTransport};
use async_trait::async_trait;
use objectmesh_common::config::RpcConfig;
use objectmesh_common::{BackendId, BackendRecord, Error, ObjectDescriptor, ObjectId, Result};
use objectmesh_proto::backend::backend_service_client::BackendServiceClient;
use objectmesh_proto::backend::{
    ConsolidateObjectVersionRequest, GetObjectPropertiesRequest, NewObjectReplicaRequest,
    NewObjectVersionRequest, UpdateObjectPropertiesRequest,
};
use std::future::Future;
use std::time::Duration;
use tonic::transport::{Channel, Endpoint};
use tracing::{debug, error, info, warn};

/// Transport producing gRPC-backed connections
pub struct GrpcTransport {
    rpc: RpcConfig,
}

impl GrpcTransport {
    /// Create a transport with the given RPC timeouts
    #[must_use]
    pub const fn new(rpc: RpcConfig) -> Self {
        Self { rpc }
    }
}

#[async_trait]
impl BackendTransport for GrpcTransport {
    type Conn = GrpcConnection;

    async fn connect(&self, record: &BackendRecord) -> Result<Self::Conn> {
        let address = format!("http://{}:{}", record.host, record.port);
        let endpoint = Endpoint::from_shared(address.clone())
            .map_err(|e| Error::remote_call(record.id, "connect", e.to_string()))?
            .connect_timeout(self.rpc.connect_timeout);
        let channel = endpoint.connect_lazy();
        info!(backend_id = %record.id, address = %address, "opened backend channel");
        Ok(GrpcConnection {
            backend_id: record.id,
            address,
            client: BackendServiceClient::new(channel),
            call_timeout: self.rpc.call_timeout,
        })
    }
}

/// A connection to one backend over a shared HTTP/2 channel
#[derive(Clone)]
pub struct GrpcConnection {
    backend_id: BackendId,
    address: String,
    client: BackendServiceClient<Channel>,
    call_timeout: Duration,
}

impl GrpcConnection {
    /// The backend this connection is bound to
    #[must_use]
    pub const fn backend_id(&self) -> BackendId {
        self.backend_id
    }

    /// The `host:port` address this connection dials
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    async fn invoke<T, F>(&self, method: &'static str, call: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<tonic::Response<T>, tonic::Status>> + Send,
    {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(Ok(response)) => Ok(response.into_inner()),
            Ok(Err(status)) => {
                warn!(
                    backend_id = %self.backend_id,
                    address = %self.address,
                    method,
                    error = %status,
                    "backend call failed"
                );
                Err(Error::remote_call(
                    self.backend_id,
                    method,
                    status.to_string(),
                ))
            }
            Err(_) => {
                error!(
                    backend_id = %self.backend_id,
                    address = %self.address,
                    method,
                    "backend call timed out"
                );
                Err(Error::remote_call(self.backend_id, method, "timeout"))
            }
        }
    }
}

#[async_trait]
impl BackendConnection for GrpcConnection {
    async fn new_version(&self, object_id: ObjectId) -> Result<ObjectDescriptor> {
        let mut client = self.client.clone();
        let request = NewObjectVersionRequest {
            object_id: object_id.to_string(),
        };
        let reply = self
            .invoke("NewObjectVersion", client.new_object_version(request))
            .await?;
        reply.object_info.parse().map_err(|e: Error| {
            Error::remote_call(
                self.backend_id,
                "NewObjectVersion",
                format!("malformed descriptor in reply: {e}"),
            )
        })
    }

    async fn consolidate_version(&self, object_id: ObjectId) -> Result<()> {
        let mut client = self.client.clone();
        let request = ConsolidateObjectVersionRequest {
            object_id: object_id.to_string(),
        };
        self.invoke(
            "ConsolidateObjectVersion",
            client.consolidate_object_version(request),
        )
        .await?;
        Ok(())
    }

    async fn new_replica(
        &self,
        object_id: ObjectId,
        target: BackendId,
        recursive: bool,
        include_remotes: bool,
    ) -> Result<()> {
        let mut client = self.client.clone();
        let request = NewObjectReplicaRequest {
            object_id: object_id.to_string(),
            backend_id: target.to_string(),
            recursive,
            include_remotes,
        };
        self.invoke("NewObjectReplica", client.new_object_replica(request))
            .await?;
        Ok(())
    }

    async fn get_properties(&self, object_id: ObjectId) -> Result<Vec<u8>> {
        let mut client = self.client.clone();
        let request = GetObjectPropertiesRequest {
            object_id: object_id.to_string(),
        };
        let reply = self
            .invoke("GetObjectProperties", client.get_object_properties(request))
            .await?;
        Ok(reply.value)
    }

    async fn update_properties(&self, object_id: ObjectId, properties: Vec<u8>) -> Result<()> {
        let mut client = self.client.clone();
        let request = UpdateObjectPropertiesRequest {
            object_id: object_id.to_string(),
            serialized_properties: properties,
        };
        self.invoke(
            "UpdateObjectProperties",
            client.update_object_properties(request),
        )
        .await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        // The HTTP/2 channel is shared by all clones and torn down when the
        // last clone drops; there is no explicit shutdown to await.
        debug!(backend_id = %self.backend_id, address = %self.address, "closing backend channel");
        Ok(())
    }
}
