/// API version v1alpha1 for cluster connection CRDs

pub mod cluster;

pub use cluster::{
    Cluster, ClusterConnection, ClusterSpec, ClusterStatus, ConnectionType,
    DockerClusterConnection, KubernetesClusterConnection,
};

/// API group for cluster connection resources
pub const API_GROUP: &str = "connect.datum.net";
/// API version for cluster connection resources
pub const API_VERSION: &str = "v1alpha1";
