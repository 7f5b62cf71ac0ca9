//! Cluster connection API types and CRDs for Kubernetes integration
//!
//! This library defines the custom resources for the cluster connection controller:
//! - Cluster: A deploy target reachable through a Kubernetes API server or a Docker engine

pub mod v1alpha1;

pub use v1alpha1::{Cluster, ClusterSpec, ClusterStatus, ConnectionType};
