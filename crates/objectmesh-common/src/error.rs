//! Error types for ObjectMesh
//!
//! This module defines the common error taxonomy used throughout the
//! client access layer. The layer performs no automatic retries: every
//! failure is wrapped with the operation context and returned to the
//! caller, who decides whether a retry is safe.

use crate::types::{BackendId, ObjectId};
use thiserror::Error;

/// Common result type for ObjectMesh operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the ObjectMesh client access layer
#[derive(Debug, Error)]
pub enum Error {
    /// The metadata store cannot be reached
    #[error("metadata store unavailable: {0}")]
    StoreUnavailable(String),

    /// The object id has no record in the metadata store
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// A stored value did not parse into the expected record shape
    #[error("malformed record at {key}: {reason}")]
    Decode { key: String, reason: String },

    /// The backend id is absent from the metadata store even after a refresh
    #[error("backend not found: {0}")]
    UnknownBackend(BackendId),

    /// A remote call to a resolved backend failed (transport, timeout or
    /// remote-side error)
    #[error("remote call {method} to backend {backend_id} failed: {reason}")]
    RemoteCall {
        backend_id: BackendId,
        method: &'static str,
        reason: String,
    },

    /// Malformed caller input, e.g. an unparseable object descriptor
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Context wrapper for failures while resolving an object's metadata
    #[error("resolving object {object_id}: {source}")]
    Resolution {
        object_id: ObjectId,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a store-unavailable error
    pub fn store_unavailable(reason: impl Into<String>) -> Self {
        Self::StoreUnavailable(reason.into())
    }

    /// Create a decode error for the given store key
    pub fn decode(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a remote-call error
    pub fn remote_call(
        backend_id: BackendId,
        method: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::RemoteCall {
            backend_id,
            method,
            reason: reason.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Wrap a failure with the object id that was being resolved
    #[must_use]
    pub fn resolution(object_id: ObjectId, source: Self) -> Self {
        Self::Resolution {
            object_id,
            source: Box::new(source),
        }
    }

    /// Check if this is a not-found error (object or backend)
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) | Self::UnknownBackend(_) => true,
            Self::Resolution { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// Check if the caller may safely retry after this error
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::StoreUnavailable(_) => true,
            Self::Resolution { source, .. } => source.is_retryable(),
            _ => false,
        }
    }
}
