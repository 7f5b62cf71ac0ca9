use cluster_api::v1alpha1::KubernetesClusterConnection;
use cluster_api::{ClusterSpec, ConnectionType};
use cluster_core::{
    ClusterKey, ConnectionError, ConnectionRecord, ConnectionRegistry, ContainerClient, KubernetesClient,
};
use std::sync::Arc;
use std::thread;

#[derive(Debug)]
struct FakeKube {
    context: String,
}

impl KubernetesClient for FakeKube {
    fn client(&self) -> kube::Client {
        unreachable!("no API server in these tests")
    }

    fn context(&self) -> &str {
        &self.context
    }

    fn namespace(&self) -> &str {
        "default"
    }
}

#[derive(Debug)]
struct FakeDocker {
    host: String,
}

impl ContainerClient for FakeDocker {
    fn host(&self) -> &str {
        &self.host
    }
}

fn spec_for(context: &str) -> ClusterSpec {
    let mut spec = ClusterSpec::default();
    spec.connection.kubernetes = Some(KubernetesClusterConnection {
        context: Some(context.to_string()),
        namespace: None,
    });
    spec
}

fn kube_record(context: &str, arch: &str) -> ConnectionRecord {
    ConnectionRecord::kubernetes(
        spec_for(context),
        Arc::new(FakeKube {
            context: context.to_string(),
        }),
        arch,
    )
}

#[test]
fn concurrent_operations_on_distinct_clusters() {
    let registry = Arc::new(ConnectionRegistry::new());
    let clusters = 64;

    thread::scope(|s| {
        for i in 0..clusters {
            let registry = registry.clone();
            s.spawn(move || {
                let key = ClusterKey::new("default", format!("cluster-{i}"));
                for round in 0..50 {
                    registry.store(key.clone(), kube_record(&format!("ctx-{i}-{round}"), "amd64"));
                    let _ = registry.get_kubernetes_client(&key);
                    let _ = registry.get_container_client(&key);
                    if i % 2 == 0 {
                        registry.delete(&key);
                    }
                }
            });
        }
    });

    for i in 0..clusters {
        let key = ClusterKey::new("default", format!("cluster-{i}"));
        if i % 2 == 0 {
            assert!(registry.get_kubernetes_client(&key).unwrap_err().is_not_found());
        } else {
            let client = registry.get_kubernetes_client(&key).unwrap();
            assert_eq!(client.context(), format!("ctx-{i}-49"));
        }
    }
    assert_eq!(registry.len(), clusters / 2);
}

// Each record's spec context and client context are written together, so any
// mismatch seen by a reader would mean it observed a partially replaced record.
#[test]
fn readers_never_observe_mixed_records() {
    let registry = Arc::new(ConnectionRegistry::new());
    let key = ClusterKey::new("default", "shared");
    registry.store(key.clone(), kube_record("ctx-0", "amd64"));

    thread::scope(|s| {
        let writer_registry = registry.clone();
        let writer_key = key.clone();
        s.spawn(move || {
            for round in 1..2000 {
                let arch = if round % 2 == 0 { "amd64" } else { "arm64" };
                writer_registry.store(writer_key.clone(), kube_record(&format!("ctx-{round}"), arch));
            }
        });

        for _ in 0..4 {
            let registry = registry.clone();
            let key = key.clone();
            s.spawn(move || {
                for _ in 0..2000 {
                    let record = registry.load(&key).expect("record is never deleted");
                    let spec_context = record
                        .spec()
                        .connection
                        .kubernetes
                        .as_ref()
                        .and_then(|k| k.context.clone())
                        .unwrap();
                    let client_context = match record.client() {
                        Some(cluster_core::ClientHandle::Kubernetes(client)) => client.context().to_string(),
                        other => panic!("unexpected client {other:?}"),
                    };
                    assert_eq!(spec_context, client_context);

                    let round: u32 = spec_context.trim_start_matches("ctx-").parse().unwrap();
                    let expected_arch = if round == 0 || round % 2 == 0 { "amd64" } else { "arm64" };
                    assert_eq!(record.arch(), expected_arch);
                }
            });
        }
    });
}

#[test]
fn last_store_wins_across_types() {
    let registry = ConnectionRegistry::new();
    let key = ClusterKey::new("dev", "default");

    registry.store(key.clone(), kube_record("kind-kind", "amd64"));
    registry.store(
        key.clone(),
        ConnectionRecord::docker(
            ClusterSpec::default(),
            Arc::new(FakeDocker {
                host: "unix:///var/run/docker.sock".to_string(),
            }),
            "arm64",
        ),
    );

    assert!(matches!(
        registry.get_kubernetes_client(&key).unwrap_err(),
        ConnectionError::TypeMismatch {
            actual: ConnectionType::Docker,
            expected: ConnectionType::Kubernetes,
        }
    ));
    let docker = registry.get_container_client(&key).unwrap();
    assert_eq!(docker.host(), "unix:///var/run/docker.sock");
    assert_eq!(registry.load(&key).unwrap().arch(), "arm64");
}

#[test]
fn failed_record_never_yields_client() {
    let registry = ConnectionRegistry::new();
    for (i, message) in ["dial timeout", "connection refused", "x509: certificate has expired"]
        .iter()
        .enumerate()
    {
        let key = ClusterKey::new("default", format!("broken-{i}"));
        registry.store(
            key.clone(),
            ConnectionRecord::failed(ClusterSpec::default(), ConnectionType::Kubernetes, *message),
        );

        let err = registry.get_kubernetes_client(&key).unwrap_err();
        assert_eq!(err.to_string(), *message);
    }
}
