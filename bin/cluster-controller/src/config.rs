//! Command line and environment configuration

use crate::logging::LogFormat;
use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

/// Maintains live client connections for Cluster resources
#[derive(Parser, Debug, Clone)]
#[command(name = "cluster-controller", version, about)]
pub struct Config {
    /// Only watch Clusters in this namespace (all namespaces when unset)
    #[arg(long, env = "CLUSTER_CONTROLLER_NAMESPACE")]
    pub namespace: Option<String>,

    /// Address for the /metrics and /healthz endpoints
    #[arg(long, env = "CLUSTER_CONTROLLER_METRICS_ADDR", default_value = "0.0.0.0:9090")]
    pub metrics_addr: SocketAddr,

    /// Seconds to wait for a cluster to answer before recording a dial failure
    #[arg(long, env = "CLUSTER_CONTROLLER_DIAL_TIMEOUT_SECS", default_value_t = 30)]
    pub dial_timeout_secs: u64,

    /// Seconds between reconciliations of a healthy Cluster
    #[arg(long, env = "CLUSTER_CONTROLLER_REQUEUE_SECS", default_value_t = 300)]
    pub requeue_secs: u64,

    /// Seconds before retrying a Cluster whose reconciliation failed
    #[arg(long, env = "CLUSTER_CONTROLLER_ERROR_REQUEUE_SECS", default_value_t = 60)]
    pub error_requeue_secs: u64,

    /// Log output format
    #[arg(long, env = "CLUSTER_CONTROLLER_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Config {
    pub fn dial_timeout(&self) -> Duration {
        Duration::from_secs(self.dial_timeout_secs)
    }

    pub fn requeue_interval(&self) -> Duration {
        Duration::from_secs(self.requeue_secs)
    }

    pub fn error_requeue_interval(&self) -> Duration {
        Duration::from_secs(self.error_requeue_secs)
    }
}
