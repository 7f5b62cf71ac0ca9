//! Connection registry for looking up cluster clients

use crate::{ClusterKey, ConnectionError, ConnectionRecord, ContainerClient, KubernetesClient, Result};
use cluster_api::ConnectionType;
use dashmap::DashMap;
use std::sync::Arc;

/// Client lookup capability consumed by reconcilers.
///
/// All returned clients are safe to share across tasks.
pub trait ClientCache: Send + Sync {
    /// Kubernetes client for the cluster, or an error for unknown clusters,
    /// connections in an error state, or connections of another type.
    fn get_kubernetes_client(&self, key: &ClusterKey) -> Result<Arc<dyn KubernetesClient>>;
}

/// ConnectionRegistry maps clusters to their current connection.
///
/// Records are stored behind an `Arc` and replaced whole, so a reader sees
/// either the previous or the new record, never a mix. Lookups for
/// different clusters do not contend on a single lock.
pub struct ConnectionRegistry {
    connections: DashMap<ClusterKey, Arc<ConnectionRecord>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Get the Kubernetes client for a cluster
    pub fn get_kubernetes_client(&self, key: &ClusterKey) -> Result<Arc<dyn KubernetesClient>> {
        let record = self.valid_record(key, ConnectionType::Kubernetes)?;
        record
            .kubernetes_client()
            .cloned()
            .ok_or_else(|| missing_client(&record))
    }

    /// Get the Docker client for the engine a compose project deploys to.
    ///
    /// Not part of [`ClientCache`]: only the compose deploy path uses it.
    pub fn get_container_client(&self, key: &ClusterKey) -> Result<Arc<dyn ContainerClient>> {
        let record = self.valid_record(key, ConnectionType::Docker)?;
        record
            .container_client()
            .cloned()
            .ok_or_else(|| missing_client(&record))
    }

    /// Insert or replace the record for a cluster, returning the stored record.
    ///
    /// Only the cluster reconciler should call this.
    pub fn store(&self, key: ClusterKey, record: ConnectionRecord) -> Arc<ConnectionRecord> {
        let record = Arc::new(record);
        self.connections.insert(key, Arc::clone(&record));
        record
    }

    /// Remove the record for a cluster, returning whether one existed.
    ///
    /// Only the cluster reconciler should call this.
    pub fn delete(&self, key: &ClusterKey) -> bool {
        self.connections.remove(key).is_some()
    }

    /// Current record for a cluster without any validation
    pub fn load(&self, key: &ClusterKey) -> Option<Arc<ConnectionRecord>> {
        self.connections.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Number of stored connections
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    // Type is checked before the stored error so a caller asking for the
    // wrong client kind never sees another kind's dial failure.
    fn valid_record(&self, key: &ClusterKey, expected: ConnectionType) -> Result<Arc<ConnectionRecord>> {
        let record = self
            .load(key)
            .ok_or_else(|| ConnectionError::NotFound(key.clone()))?;

        if record.connection_type() != expected {
            return Err(ConnectionError::TypeMismatch {
                actual: record.connection_type(),
                expected,
            });
        }

        if let Some(error) = record.error() {
            return Err(ConnectionError::Connection(error.to_string()));
        }

        Ok(record)
    }
}

fn missing_client(record: &ConnectionRecord) -> ConnectionError {
    ConnectionError::Connection(format!("{} connection has no client", record.connection_type()))
}

impl ClientCache for ConnectionRegistry {
    fn get_kubernetes_client(&self, key: &ClusterKey) -> Result<Arc<dyn KubernetesClient>> {
        ConnectionRegistry::get_kubernetes_client(self, key)
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
