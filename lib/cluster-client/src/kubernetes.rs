//! Kubernetes API clients built from kubeconfig contexts

use crate::DialError;
use cluster_api::v1alpha1::KubernetesClusterConnection;
use cluster_core::KubernetesClient;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tracing::debug;

/// KubeClient wraps a Kubernetes client for one kubeconfig context
#[derive(Clone)]
pub struct KubeClient {
    client: Client,
    context: String,
    namespace: String,
}

impl KubeClient {
    /// Build a client for the context named in the spec, or the current context.
    ///
    /// This does not contact the API server; see [`KubeClient::arch`].
    pub async fn connect(spec: &KubernetesClusterConnection) -> Result<Self, DialError> {
        let context = match &spec.context {
            Some(context) => context.clone(),
            None => Kubeconfig::read()?.current_context.unwrap_or_default(),
        };

        let options = KubeConfigOptions {
            context: spec.context.clone(),
            ..Default::default()
        };
        let mut config = Config::from_kubeconfig(&options).await?;
        if let Some(namespace) = &spec.namespace {
            config.default_namespace = namespace.clone();
        }
        let namespace = config.default_namespace.clone();

        debug!(
            "Building Kubernetes client for context {} ({})",
            context, config.cluster_url
        );
        let client = Client::try_from(config)?;

        Ok(Self {
            client,
            context,
            namespace,
        })
    }

    /// Architecture of the API server's platform, e.g. `arm64`
    pub async fn arch(&self) -> Result<String, DialError> {
        let info = self.client.apiserver_version().await?;
        Ok(arch_from_platform(&info.platform))
    }
}

impl std::fmt::Debug for KubeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeClient")
            .field("context", &self.context)
            .field("namespace", &self.namespace)
            .finish()
    }
}

impl KubernetesClient for KubeClient {
    fn client(&self) -> Client {
        self.client.clone()
    }

    fn context(&self) -> &str {
        &self.context
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }
}

// "linux/amd64" -> "amd64"
fn arch_from_platform(platform: &str) -> String {
    platform.rsplit('/').next().unwrap_or_default().to_string()
}
