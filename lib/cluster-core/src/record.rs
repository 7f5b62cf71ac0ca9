//! Connection records

use crate::{ContainerClient, KubernetesClient};
use chrono::{DateTime, Utc};
use cluster_api::{ClusterSpec, ConnectionType};
use std::sync::Arc;

/// Message used when a failed record is built without a reason.
const UNKNOWN_CONNECTION_ERROR: &str = "cluster connection failed";

/// Client handle held by a record, tagged by connection type
#[derive(Clone, Debug)]
pub enum ClientHandle {
    Kubernetes(Arc<dyn KubernetesClient>),
    Docker(Arc<dyn ContainerClient>),
}

impl ClientHandle {
    pub fn connection_type(&self) -> ConnectionType {
        match self {
            ClientHandle::Kubernetes(_) => ConnectionType::Kubernetes,
            ClientHandle::Docker(_) => ConnectionType::Docker,
        }
    }
}

/// State of one cluster's connection.
///
/// Records are never modified after construction. A record either holds a
/// client handle matching its connection type and no error, or holds an
/// error (and no handle).
#[derive(Clone, Debug)]
pub struct ConnectionRecord {
    connection_type: ConnectionType,
    spec: ClusterSpec,
    client: Option<ClientHandle>,
    error: String,
    created_at: DateTime<Utc>,
    arch: String,
}

impl ConnectionRecord {
    /// Healthy Kubernetes connection
    pub fn kubernetes(
        spec: ClusterSpec,
        client: Arc<dyn KubernetesClient>,
        arch: impl Into<String>,
    ) -> Self {
        Self::connected(spec, ClientHandle::Kubernetes(client), arch.into())
    }

    /// Healthy Docker connection
    pub fn docker(
        spec: ClusterSpec,
        client: Arc<dyn ContainerClient>,
        arch: impl Into<String>,
    ) -> Self {
        Self::connected(spec, ClientHandle::Docker(client), arch.into())
    }

    /// Failed connection of the given type. An empty error is replaced with a
    /// generic message so the record never reads as healthy.
    pub fn failed(
        spec: ClusterSpec,
        connection_type: ConnectionType,
        error: impl Into<String>,
    ) -> Self {
        let mut error = error.into();
        if error.is_empty() {
            error = UNKNOWN_CONNECTION_ERROR.to_string();
        }

        Self {
            connection_type,
            spec,
            client: None,
            error,
            created_at: Utc::now(),
            arch: String::new(),
        }
    }

    fn connected(spec: ClusterSpec, client: ClientHandle, arch: String) -> Self {
        Self {
            connection_type: client.connection_type(),
            spec,
            client: Some(client),
            error: String::new(),
            created_at: Utc::now(),
            arch,
        }
    }

    pub fn connection_type(&self) -> ConnectionType {
        self.connection_type
    }

    /// Spec the connection was made from
    pub fn spec(&self) -> &ClusterSpec {
        &self.spec
    }

    pub fn client(&self) -> Option<&ClientHandle> {
        self.client.as_ref()
    }

    /// Recorded connection error, `None` when healthy
    pub fn error(&self) -> Option<&str> {
        if self.error.is_empty() {
            None
        } else {
            Some(&self.error)
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.error.is_empty()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Target architecture, empty if unknown
    pub fn arch(&self) -> &str {
        &self.arch
    }

    pub(crate) fn kubernetes_client(&self) -> Option<&Arc<dyn KubernetesClient>> {
        match &self.client {
            Some(ClientHandle::Kubernetes(client)) => Some(client),
            _ => None,
        }
    }

    pub(crate) fn container_client(&self) -> Option<&Arc<dyn ContainerClient>> {
        match &self.client {
            Some(ClientHandle::Docker(client)) => Some(client),
            _ => None,
        }
    }
}
