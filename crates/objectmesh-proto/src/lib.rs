//! ObjectMesh Protocol - gRPC service definitions
//!
//! This crate contains the protobuf-generated code for ObjectMesh's
//! backend service boundary.

/// Backend service (per-object lifecycle operations)
pub mod backend {
    tonic::include_proto!("objectmesh.backend");
}
