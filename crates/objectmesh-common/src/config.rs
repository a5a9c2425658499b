//! Configuration types for the ObjectMesh client
//!
//! Callers construct a [`ClientConfig`] (or rely on the defaults) and hand
//! it to the client at init time; nothing here reads files or the
//! environment.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the client access layer
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Metadata store configuration
    pub metadata: MetadataConfig,
    /// Backend RPC configuration
    pub rpc: RpcConfig,
}

/// Metadata store connection configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Store URL, e.g. `redis://127.0.0.1:6379`
    pub url: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
        }
    }
}

/// Timeouts for backend RPC channels.
///
/// Every remote call is bounded; the transport is never allowed to block
/// indefinitely.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Time allowed for establishing a backend channel
    pub connect_timeout: Duration,
    /// Time allowed for a single request/response exchange
    pub call_timeout: Duration,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            call_timeout: Duration::from_secs(30),
        }
    }
}
