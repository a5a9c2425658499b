//! ObjectMesh Metadata - read path into the shared metadata store
//!
//! The accessor is a pure read path: it fetches single object records by id
//! and enumerates all backend records via a prefix scan. No caching happens
//! at this layer; connection caching is the registry's responsibility, one
//! layer up.

pub mod kv;
pub mod reader;
pub mod store;

pub use kv::{KvStore, MemoryKvStore};
pub use reader::{MetadataSource, RecordReader};
pub use store::RedisKvStore;
