//! Client handles stored in connection records
//!
//! Handles are shared read-only by every caller that retrieves them, so
//! implementations must be safe to use from many tasks at once.

use std::fmt;

/// A connected Kubernetes API client
pub trait KubernetesClient: Send + Sync + fmt::Debug {
    /// Underlying API client. Cloning is cheap and shares the connection pool.
    fn client(&self) -> kube::Client;

    /// Kubeconfig context the client was built from
    fn context(&self) -> &str;

    /// Default namespace for namespaced requests
    fn namespace(&self) -> &str;
}

/// A connected container engine client, such as a Docker engine
pub trait ContainerClient: Send + Sync + fmt::Debug {
    /// Engine address, e.g. `unix:///var/run/docker.sock`
    fn host(&self) -> &str;

    /// `DOCKER_HOST` environment pointing at this engine
    fn env(&self) -> Vec<(String, String)> {
        vec![("DOCKER_HOST".to_string(), self.host().to_string())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct TcpEngine;

    impl ContainerClient for TcpEngine {
        fn host(&self) -> &str {
            "tcp://10.0.0.5:2375"
        }
    }

    #[test]
    fn test_default_container_env() {
        assert_eq!(
            TcpEngine.env(),
            vec![("DOCKER_HOST".to_string(), "tcp://10.0.0.5:2375".to_string())]
        );
    }
}
