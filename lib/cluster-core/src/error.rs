use crate::ClusterKey;
use cluster_api::ConnectionType;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConnectionError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("cluster client does not exist: {0}")]
    NotFound(ClusterKey),

    #[error("incorrect cluster client type: got {actual}, expected {expected}")]
    TypeMismatch {
        actual: ConnectionType,
        expected: ConnectionType,
    },

    /// Error recorded when the connection was made, returned as-is
    #[error("{0}")]
    Connection(String),
}

impl ConnectionError {
    /// The cluster has no connection yet; callers usually treat it as not ready.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConnectionError::NotFound(_))
    }
}
