//! Client construction for cluster connections
//!
//! Builds the Kubernetes and Docker clients stored in the connection registry
//! and probes each target's architecture while doing so.

pub mod connector;
pub mod docker;
pub mod error;
pub mod kubernetes;

pub use connector::{Connected, Connector, DefaultConnector};
pub use docker::{DockerClient, EngineVersion};
pub use error::DialError;
pub use kubernetes::KubeClient;
