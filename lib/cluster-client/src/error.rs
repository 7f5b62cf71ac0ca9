use std::time::Duration;
use thiserror::Error;

/// Failure to establish a cluster connection.
///
/// The display form is stored verbatim on the failed connection record.
#[derive(Error, Debug)]
pub enum DialError {
    #[error("loading kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    #[error("kubernetes: {0}")]
    Kubernetes(#[from] kube::Error),

    #[error("timed out connecting to {target} after {timeout:?}")]
    Timeout { target: String, timeout: Duration },

    #[error("unsupported Docker host {0:?}: expected unix:// or tcp://")]
    UnsupportedHost(String),

    #[error("connecting to Docker engine at {host}: {source}")]
    Io {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Docker engine request failed: {0}")]
    Http(#[from] hyper::Error),

    #[error("invalid Docker engine request: {0}")]
    Request(#[from] hyper::http::Error),

    #[error("Docker engine returned {status}: {body}")]
    EngineStatus { status: u16, body: String },

    #[error("decoding Docker engine response: {0}")]
    Decode(#[from] serde_json::Error),
}
