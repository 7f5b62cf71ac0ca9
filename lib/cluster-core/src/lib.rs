//! Core cluster connection functionality
//!
//! This library provides:
//! - Connection records describing one cluster's client and health
//! - A concurrent registry of connections keyed by cluster
//! - Typed accessors that validate connection type and error state

pub mod client;
pub mod error;
pub mod key;
pub mod record;
pub mod registry;

pub use client::{ContainerClient, KubernetesClient};
pub use error::{ConnectionError, Result};
pub use key::ClusterKey;
pub use record::{ClientHandle, ConnectionRecord};
pub use registry::{ClientCache, ConnectionRegistry};

pub use cluster_api::ConnectionType;
