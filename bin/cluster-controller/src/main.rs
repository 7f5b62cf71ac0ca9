use anyhow::Result;
use clap::Parser;
use cluster_client::DefaultConnector;
use cluster_core::ConnectionRegistry;
use kube::Client;
use std::sync::Arc;
use tracing::{error, info};

mod config;
mod controller;
mod error;
mod logging;
mod metrics;
mod reconciler;
mod server;

use config::Config;
use controller::ClusterController;
use metrics::ControllerMetrics;
use reconciler::ClusterReconciler;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    logging::init(config.log_format);

    info!("Starting cluster-controller...");

    let client = Client::try_default().await?;
    let registry = Arc::new(ConnectionRegistry::new());
    let metrics = ControllerMetrics::new()?;

    let connector = DefaultConnector::new(config.dial_timeout());
    let reconciler = ClusterReconciler::new(registry, connector, metrics.clone());
    let controller = ClusterController::new(client, reconciler, metrics.clone(), &config);
    info!("Cluster controller initialized (dial timeout: {:?})", config.dial_timeout());

    let metrics_addr = config.metrics_addr;
    tokio::spawn(async move {
        if let Err(e) = server::serve(metrics_addr, metrics).await {
            error!("Metrics server error: {}", e);
        }
    });

    // Start Cluster reconciliation
    tokio::spawn(async move {
        if let Err(e) = controller.run().await {
            error!("Cluster controller error: {}", e);
        }
    });

    // Keep the process alive
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting...");

    Ok(())
}
