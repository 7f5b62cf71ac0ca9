use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cluster describes a deploy target and how to connect to it.
///
/// Exactly one of `connection.kubernetes` or `connection.docker` is expected
/// to be set.
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "connect.datum.net",
    version = "v1alpha1",
    kind = "Cluster",
    plural = "clusters",
    namespaced,
    derive = "Default",
    status = "ClusterStatus",
    printcolumn = r#"{"name":"Type","type":"string","jsonPath":".status.connectionType"}"#,
    printcolumn = r#"{"name":"Arch","type":"string","jsonPath":".status.arch"}"#,
    printcolumn = r#"{"name":"Error","type":"string","jsonPath":".status.error"}"#,
)]
pub struct ClusterSpec {
    /// Connection settings for the cluster
    #[serde(default)]
    pub connection: ClusterConnection,
}

impl ClusterSpec {
    /// Connection type declared by this spec.
    ///
    /// Returns `None` when the spec declares no connection or more than one.
    pub fn connection_type(&self) -> Option<ConnectionType> {
        match (&self.connection.kubernetes, &self.connection.docker) {
            (Some(_), None) => Some(ConnectionType::Kubernetes),
            (None, Some(_)) => Some(ConnectionType::Docker),
            _ => None,
        }
    }
}

/// Connection settings; one variant must be populated
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClusterConnection {
    /// Connect to a Kubernetes API server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubernetes: Option<KubernetesClusterConnection>,

    /// Connect to a Docker engine
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker: Option<DockerClusterConnection>,
}

/// Kubernetes connection settings
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KubernetesClusterConnection {
    /// Kubeconfig context to use (defaults to the current context)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Default namespace override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// Docker engine connection settings
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DockerClusterConnection {
    /// Engine address, e.g. `unix:///var/run/docker.sock` or `tcp://10.0.0.5:2375`.
    /// Falls back to `DOCKER_HOST`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

/// Kind of client a cluster connection materializes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Kubernetes,
    Docker,
}

impl ConnectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionType::Kubernetes => "kubernetes",
            ConnectionType::Docker => "docker",
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a Cluster
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStatus {
    /// Type of the current connection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_type: Option<ConnectionType>,

    /// Architecture reported by the cluster (e.g. amd64, arm64)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,

    /// Connection error, if the last connection attempt failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// When the current connection was established (RFC 3339)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected_timestamp: Option<String>,
}
