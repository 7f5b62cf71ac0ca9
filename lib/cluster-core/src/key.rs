//! Cluster identifiers

use kube::{Resource, ResourceExt};
use std::fmt;

/// Namespace/name pair identifying a cluster resource
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClusterKey {
    pub namespace: String,
    pub name: String,
}

impl ClusterKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Build the key for a Kubernetes object, falling back to the "default" namespace
    pub fn from_resource<K: Resource>(obj: &K) -> Self {
        Self {
            namespace: obj.namespace().unwrap_or_else(|| "default".to_string()),
            name: obj.name_any(),
        }
    }
}

impl fmt::Display for ClusterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cluster_api::{Cluster, ClusterSpec};

    #[test]
    fn test_display() {
        assert_eq!(ClusterKey::new("dev", "default").to_string(), "dev/default");
    }

    #[test]
    fn test_from_resource() {
        let mut cluster = Cluster::new("docker-desktop", ClusterSpec::default());
        assert_eq!(
            ClusterKey::from_resource(&cluster),
            ClusterKey::new("default", "docker-desktop")
        );

        cluster.metadata.namespace = Some("dev".to_string());
        assert_eq!(
            ClusterKey::from_resource(&cluster),
            ClusterKey::new("dev", "docker-desktop")
        );
    }
}
