//! Cluster controller for reconciling Cluster resources

use crate::config::Config;
use crate::error::{ReconcileError, Result};
use crate::metrics::ControllerMetrics;
use crate::reconciler::{status_for, ClusterReconciler};
use cluster_api::{Cluster, ClusterStatus};
use cluster_client::Connector;
use cluster_core::ClusterKey;
use futures::StreamExt;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client, Resource, ResourceExt};
use kube_runtime::finalizer::{finalizer, Event};
use kube_runtime::{controller::Action, Controller};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Finalizer that keeps deleted Clusters around until their connection is dropped
pub const CLUSTER_FINALIZER: &str = "connect.datum.net/connection";

const FIELD_MANAGER: &str = "cluster-controller";

struct Context<C> {
    client: Client,
    reconciler: ClusterReconciler<C>,
    metrics: ControllerMetrics,
    requeue_interval: Duration,
    error_requeue_interval: Duration,
}

pub struct ClusterController<C> {
    namespace: Option<String>,
    context: Arc<Context<C>>,
}

impl<C: Connector + 'static> ClusterController<C> {
    pub fn new(
        client: Client,
        reconciler: ClusterReconciler<C>,
        metrics: ControllerMetrics,
        config: &Config,
    ) -> Self {
        Self {
            namespace: config.namespace.clone(),
            context: Arc::new(Context {
                client,
                reconciler,
                metrics,
                requeue_interval: config.requeue_interval(),
                error_requeue_interval: config.error_requeue_interval(),
            }),
        }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        info!("Starting Cluster reconciliation");

        let clusters: Api<Cluster> = match &self.namespace {
            Some(namespace) => Api::namespaced(self.context.client.clone(), namespace),
            None => Api::all(self.context.client.clone()),
        };

        let mut stream = Controller::new(clusters, Default::default())
            .run(reconcile::<C>, error_policy::<C>, self.context.clone())
            .boxed();

        // Process the reconciliation stream
        while let Some(item) = stream.next().await {
            match item {
                Ok((cluster, _)) => debug!("Reconciled Cluster {}", cluster),
                Err(e) => warn!("Error in reconciliation stream: {}", e),
            }
        }

        Ok(())
    }
}

async fn reconcile<C: Connector + 'static>(cluster: Arc<Cluster>, ctx: Arc<Context<C>>) -> Result<Action> {
    let namespace = cluster.namespace().unwrap_or_else(|| "default".to_string());
    let api: Api<Cluster> = Api::namespaced(ctx.client.clone(), &namespace);
    debug!("Reconciling Cluster {}/{}", namespace, cluster.name_any());

    let (api_ref, ctx_ref) = (&api, &ctx);
    let result = finalizer(&api, CLUSTER_FINALIZER, cluster, |event| async move {
        match event {
            Event::Apply(cluster) => apply(cluster, api_ref, ctx_ref).await,
            Event::Cleanup(cluster) => cleanup(cluster, ctx_ref).await,
        }
    })
    .await
    .map_err(|e| ReconcileError::Finalizer(Box::new(e)));

    let outcome = if result.is_ok() { "success" } else { "error" };
    ctx.metrics.reconciliations_total.with_label_values(&[outcome]).inc();
    result
}

async fn apply<C: Connector>(cluster: Arc<Cluster>, api: &Api<Cluster>, ctx: &Context<C>) -> Result<Action> {
    let key = ClusterKey::from_resource(cluster.as_ref());

    let status = match ctx.reconciler.ensure_connected(&key, &cluster.spec).await {
        Ok(record) => status_for(&record),
        Err(e @ ReconcileError::InvalidSpec(_)) => {
            warn!("Cluster {} has an invalid spec: {}", key, e);
            ClusterStatus {
                error: Some(e.to_string()),
                ..Default::default()
            }
        }
        Err(e) => return Err(e),
    };

    if cluster.status.as_ref() != Some(&status) {
        let patch = serde_json::json!({
            "apiVersion": Cluster::api_version(&()),
            "kind": Cluster::kind(&()),
            "status": status,
        });
        api.patch_status(
            &cluster.name_any(),
            &PatchParams::apply(FIELD_MANAGER).force(),
            &Patch::Apply(&patch),
        )
        .await?;
        debug!("Updated status for Cluster {}", key);
    }

    Ok(Action::requeue(ctx.requeue_interval))
}

async fn cleanup<C: Connector>(cluster: Arc<Cluster>, ctx: &Context<C>) -> Result<Action> {
    let key = ClusterKey::from_resource(cluster.as_ref());
    ctx.reconciler.disconnect(&key);
    Ok(Action::await_change())
}

fn error_policy<C: Connector>(cluster: Arc<Cluster>, error: &ReconcileError, ctx: Arc<Context<C>>) -> Action {
    warn!("Error reconciling Cluster {}: {}", cluster.name_any(), error);
    Action::requeue(ctx.error_requeue_interval)
}
