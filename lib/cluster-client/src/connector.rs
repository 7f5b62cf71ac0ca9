//! Dialing cluster connections

use crate::{DialError, DockerClient, KubeClient};
use async_trait::async_trait;
use cluster_api::v1alpha1::{DockerClusterConnection, KubernetesClusterConnection};
use cluster_core::{ContainerClient, KubernetesClient};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// A freshly dialed client and the architecture it reported
#[derive(Debug)]
pub struct Connected<T> {
    pub client: T,
    pub arch: String,
}

/// Connector establishes cluster connections for the reconciler
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect_kubernetes(
        &self,
        spec: &KubernetesClusterConnection,
    ) -> Result<Connected<Arc<dyn KubernetesClient>>, DialError>;

    async fn connect_docker(
        &self,
        spec: &DockerClusterConnection,
    ) -> Result<Connected<Arc<dyn ContainerClient>>, DialError>;
}

/// Connector backed by [`KubeClient`] and [`DockerClient`].
///
/// A connection only counts as established once the target has answered a
/// version request.
pub struct DefaultConnector {
    timeout: Duration,
}

impl DefaultConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn bounded<T, F>(&self, target: String, dial: F) -> Result<T, DialError>
    where
        F: Future<Output = Result<T, DialError>> + Send,
    {
        tokio::time::timeout(self.timeout, dial)
            .await
            .map_err(|_| DialError::Timeout {
                target,
                timeout: self.timeout,
            })?
    }
}

impl Default for DefaultConnector {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[async_trait]
impl Connector for DefaultConnector {
    async fn connect_kubernetes(
        &self,
        spec: &KubernetesClusterConnection,
    ) -> Result<Connected<Arc<dyn KubernetesClient>>, DialError> {
        let target = match &spec.context {
            Some(context) => format!("Kubernetes context {}", context),
            None => "current Kubernetes context".to_string(),
        };
        debug!("Dialing {}", target);

        let connected = self
            .bounded(target, async {
                let client = KubeClient::connect(spec).await?;
                let arch = client.arch().await?;
                Ok::<_, DialError>(Connected { client, arch })
            })
            .await?;

        info!(
            "Connected to Kubernetes context {} (arch: {})",
            connected.client.context(),
            connected.arch
        );
        Ok(Connected {
            client: Arc::new(connected.client),
            arch: connected.arch,
        })
    }

    async fn connect_docker(
        &self,
        spec: &DockerClusterConnection,
    ) -> Result<Connected<Arc<dyn ContainerClient>>, DialError> {
        let client = DockerClient::new(spec)?;
        debug!("Dialing Docker engine {}", client.host());

        let version = self
            .bounded(format!("Docker engine {}", client.host()), client.version())
            .await?;

        info!(
            "Connected to Docker engine {} (version: {}, arch: {})",
            client.host(),
            version.version,
            version.arch
        );
        Ok(Connected {
            client: Arc::new(client),
            arch: version.arch,
        })
    }
}
