//! Prometheus metrics for cluster reconciliation

use anyhow::Result;
use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Metrics collected by the controller
#[derive(Clone)]
pub struct ControllerMetrics {
    /// Reconciliations by result (success, error)
    pub reconciliations_total: IntCounterVec,
    /// Connection attempts by connection type and result
    pub dials_total: IntCounterVec,
    /// Connections currently held in the registry
    pub connections: IntGauge,
    registry: Registry,
}

impl ControllerMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let reconciliations_total = IntCounterVec::new(
            Opts::new("cluster_reconciliations_total", "Total Cluster reconciliations"),
            &["result"],
        )?;

        let dials_total = IntCounterVec::new(
            Opts::new("cluster_dials_total", "Total cluster connection attempts"),
            &["type", "result"],
        )?;

        let connections = IntGauge::new(
            "cluster_connections",
            "Cluster connections currently registered",
        )?;

        registry.register(Box::new(reconciliations_total.clone()))?;
        registry.register(Box::new(dials_total.clone()))?;
        registry.register(Box::new(connections.clone()))?;

        Ok(Self {
            reconciliations_total,
            dials_total,
            connections,
            registry,
        })
    }

    /// Gather all metrics in Prometheus text format
    pub fn gather(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = vec![];
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
