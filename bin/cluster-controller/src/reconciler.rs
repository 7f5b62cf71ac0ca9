//! Connection lifecycle for Cluster resources
//!
//! Decides when a cluster must be (re)dialed and keeps the connection
//! registry in sync with the Cluster specs it sees.

use crate::error::{ReconcileError, Result};
use crate::metrics::ControllerMetrics;
use chrono::SecondsFormat;
use cluster_api::{ClusterSpec, ClusterStatus, ConnectionType};
use cluster_client::Connector;
use cluster_core::{ClusterKey, ConnectionRecord, ConnectionRegistry};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct ClusterReconciler<C> {
    registry: Arc<ConnectionRegistry>,
    connector: C,
    metrics: ControllerMetrics,
}

impl<C: Connector> ClusterReconciler<C> {
    pub fn new(registry: Arc<ConnectionRegistry>, connector: C, metrics: ControllerMetrics) -> Self {
        Self {
            registry,
            connector,
            metrics,
        }
    }

    #[cfg(test)]
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Make sure the registry holds a connection made from `spec`.
    ///
    /// An existing record for the same spec is returned as-is, including a
    /// recorded failure: it is not dialed again until the spec changes.
    pub async fn ensure_connected(&self, key: &ClusterKey, spec: &ClusterSpec) -> Result<Arc<ConnectionRecord>> {
        if let Some(existing) = self.registry.load(key) {
            if existing.spec() == spec {
                debug!("Cluster {} connection is current", key);
                return Ok(existing);
            }
            info!("Cluster {} spec changed, reconnecting", key);
        }

        let record = match self.dial(spec).await {
            Ok(record) => record,
            Err(e) => {
                // Nothing valid to connect to; drop any connection made from an older spec.
                if self.registry.delete(key) {
                    self.metrics.connections.set(self.registry.len() as i64);
                }
                return Err(e);
            }
        };

        match record.error() {
            Some(error) => warn!("Cluster {} connection failed: {}", key, error),
            None => info!("Cluster {} connected ({})", key, record.connection_type()),
        }

        let record = self.registry.store(key.clone(), record);
        self.metrics.connections.set(self.registry.len() as i64);
        Ok(record)
    }

    /// Forget the connection for a removed cluster
    pub fn disconnect(&self, key: &ClusterKey) {
        if self.registry.delete(key) {
            info!("Cluster {} disconnected", key);
        }
        self.metrics.connections.set(self.registry.len() as i64);
    }

    async fn dial(&self, spec: &ClusterSpec) -> Result<ConnectionRecord> {
        let connection = &spec.connection;
        let (connection_type, result) = match (&connection.kubernetes, &connection.docker) {
            (Some(kubernetes), None) => (
                ConnectionType::Kubernetes,
                self.connector
                    .connect_kubernetes(kubernetes)
                    .await
                    .map(|c| ConnectionRecord::kubernetes(spec.clone(), c.client, c.arch)),
            ),
            (None, Some(docker)) => (
                ConnectionType::Docker,
                self.connector
                    .connect_docker(docker)
                    .await
                    .map(|c| ConnectionRecord::docker(spec.clone(), c.client, c.arch)),
            ),
            (None, None) => {
                return Err(ReconcileError::InvalidSpec(
                    "connection must set kubernetes or docker".to_string(),
                ))
            }
            (Some(_), Some(_)) => {
                return Err(ReconcileError::InvalidSpec(
                    "connection must set only one of kubernetes or docker".to_string(),
                ))
            }
        };

        let outcome = if result.is_ok() { "success" } else { "error" };
        self.metrics
            .dials_total
            .with_label_values(&[connection_type.as_str(), outcome])
            .inc();

        Ok(result.unwrap_or_else(|e| ConnectionRecord::failed(spec.clone(), connection_type, e.to_string())))
    }
}

/// Cluster status describing a stored connection
pub fn status_for(record: &ConnectionRecord) -> ClusterStatus {
    ClusterStatus {
        connection_type: Some(record.connection_type()),
        arch: Some(record.arch().to_string()).filter(|arch| !arch.is_empty()),
        error: record.error().map(str::to_string),
        connected_timestamp: record
            .is_healthy()
            .then(|| record.created_at().to_rfc3339_opts(SecondsFormat::Secs, true)),
    }
}
