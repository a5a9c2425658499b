//! Core type definitions for ObjectMesh
//!
//! This module defines the fundamental types used throughout the system:
//! identifiers, the metadata records stored in the shared key/value store,
//! and the object descriptor exchanged with external callers.

use crate::error::Error;
use derive_more::{From, Into};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Key prefix under which object records are stored
pub const OBJECT_KEY_PREFIX: &str = "/object/";

/// Key prefix under which backend records are stored
pub const BACKEND_KEY_PREFIX: &str = "/backend/";

/// Unique identifier for a stored object
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, From, Into)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// Generate a new random object ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from existing UUID
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ObjectId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Unique identifier for a backend node
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, From, Into)]
pub struct BackendId(Uuid);

impl BackendId {
    /// Generate a new random backend ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from existing UUID
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for BackendId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BackendId({})", self.0)
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BackendId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Unique identifier for a platform instance (federation owner of a backend)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, From, Into)]
pub struct PlatformId(Uuid);

impl PlatformId {
    /// Generate a new random platform ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from existing UUID
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for PlatformId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlatformId({})", self.0)
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata record for one stored object.
///
/// Read-only snapshot fetched on demand from the metadata store; a later
/// fetch may see different data. Serialized as JSON under
/// `/object/{id}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// Object identifier
    pub id: ObjectId,
    /// Dataset the object belongs to (descriptive only)
    #[serde(default)]
    pub dataset_name: Option<String>,
    /// Registered class of the object (descriptive only)
    pub class_name: String,
    /// Backend holding the authoritative copy; resolution fails if absent
    pub master_backend_id: Option<BackendId>,
    /// Backends holding secondary copies, in stored order
    #[serde(default)]
    pub replica_backend_ids: Vec<BackendId>,
    /// Advisory read-only flag, not enforced by this layer
    #[serde(default)]
    pub is_read_only: bool,
    /// For version objects, the object this is a version of
    #[serde(default)]
    pub original_object_id: Option<ObjectId>,
    /// Versions derived from this object
    #[serde(default)]
    pub version_object_ids: Vec<ObjectId>,
}

impl ObjectRecord {
    /// Store key for the record of the given object
    #[must_use]
    pub fn key_for(id: ObjectId) -> String {
        format!("{OBJECT_KEY_PREFIX}{id}")
    }

    /// Store key for this record
    #[must_use]
    pub fn key(&self) -> String {
        Self::key_for(self.id)
    }
}

/// Reachability record for one backend node.
///
/// Serialized as JSON under `/backend/{id}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendRecord {
    /// Backend identifier, stable across the node's lifetime
    pub id: BackendId,
    /// Network host
    pub host: String,
    /// Network port
    pub port: u16,
    /// Owning platform instance (opaque to this layer)
    pub owner_id: PlatformId,
}

impl BackendRecord {
    /// Store key for the record of the given backend
    #[must_use]
    pub fn key_for(id: BackendId) -> String {
        format!("{BACKEND_KEY_PREFIX}{id}")
    }

    /// Store key for this record
    #[must_use]
    pub fn key(&self) -> String {
        Self::key_for(self.id)
    }
}

/// Structured reference to an object and its master backend.
///
/// This is the input to the lifecycle operations. The legacy wire form is
/// the colon-delimited string `objectId:masterBackendId[:className]`, parsed
/// via [`FromStr`] and rendered via [`fmt::Display`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectDescriptor {
    /// The referenced object
    pub object_id: ObjectId,
    /// Backend holding the authoritative copy
    pub master_backend_id: BackendId,
    /// Registered class name, when known
    pub class_name: Option<String>,
}

impl ObjectDescriptor {
    /// Create a descriptor without a class name
    #[must_use]
    pub const fn new(object_id: ObjectId, master_backend_id: BackendId) -> Self {
        Self {
            object_id,
            master_backend_id,
            class_name: None,
        }
    }

    /// Set the class name
    #[must_use]
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }
}

impl fmt::Display for ObjectDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.object_id, self.master_backend_id)?;
        if let Some(class_name) = &self.class_name {
            write!(f, ":{class_name}")?;
        }
        Ok(())
    }
}

impl FromStr for ObjectDescriptor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() < 2 || parts.len() > 3 {
            return Err(Error::invalid_argument(format!(
                "malformed object descriptor {s:?}: expected objectId:masterBackendId[:className]"
            )));
        }
        let object_id = parts[0].parse().map_err(|e| {
            Error::invalid_argument(format!("malformed object id in descriptor {s:?}: {e}"))
        })?;
        let master_backend_id = parts[1].parse().map_err(|e| {
            Error::invalid_argument(format!("malformed backend id in descriptor {s:?}: {e}"))
        })?;
        let class_name = parts.get(2).map(|c| (*c).to_string());
        Ok(Self {
            object_id,
            master_backend_id,
            class_name,
        })
    }
}

impl TryFrom<&ObjectRecord> for ObjectDescriptor {
    type Error = Error;

    fn try_from(record: &ObjectRecord) -> Result<Self, Self::Error> {
        let master_backend_id = record.master_backend_id.ok_or_else(|| {
            Error::invalid_argument(format!("object {} has no master backend", record.id))
        })?;
        Ok(Self {
            object_id: record.id,
            master_backend_id,
            class_name: Some(record.class_name.clone()),
        })
    }
}
