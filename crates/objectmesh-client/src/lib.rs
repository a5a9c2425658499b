//! ObjectMesh Client - backend connection registry and object resolution
//!
//! This crate is the client-side access layer of the platform: it turns
//! object and backend metadata into live gRPC connections, caches those
//! connections across calls, and drives the per-object lifecycle
//! operations (versioning, consolidation, replica creation) against the
//! backend that owns the master copy.

pub mod grpc;
pub mod registry;
pub mod resolver;
pub mod transport;

#[cfg(test)]
mod testing;

pub use grpc::{GrpcConnection, GrpcTransport};
pub use registry::BackendRegistry;
pub use resolver::{Client, ObjectClient};
pub use transport::{BackendConnection, BackendTransport};
