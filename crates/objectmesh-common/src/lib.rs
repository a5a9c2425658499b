//! ObjectMesh Common - Shared types and utilities
//!
//! This crate provides common types, error definitions, and configuration
//! used across all ObjectMesh components.

pub mod config;
pub mod error;
pub mod types;

pub use config::ClientConfig;
pub use error::{Error, Result};
pub use types::*;
