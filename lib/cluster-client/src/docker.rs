//! Docker engine client speaking HTTP/1.1 over Unix or TCP sockets

use crate::DialError;
use cluster_api::v1alpha1::DockerClusterConnection;
use cluster_core::ContainerClient;
use http_body_util::{BodyExt, Empty};
use hyper::body::{Bytes, Incoming};
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use serde::Deserialize;
use std::path::PathBuf;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::debug;

/// Engine address used when neither the spec nor `DOCKER_HOST` names one
pub const DEFAULT_DOCKER_HOST: &str = "unix:///var/run/docker.sock";

/// Version information reported by `GET /version`
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EngineVersion {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub os: String,
    #[serde(default)]
    pub arch: String,
}

#[derive(Clone, Debug, PartialEq)]
enum Endpoint {
    Unix(PathBuf),
    Tcp(String),
}

/// DockerClient talks to one Docker engine
#[derive(Clone, Debug)]
pub struct DockerClient {
    host: String,
    endpoint: Endpoint,
}

impl DockerClient {
    /// Create a client for the engine named by the spec, `DOCKER_HOST`, or the default socket.
    ///
    /// No connection is made until a request is sent.
    pub fn new(spec: &DockerClusterConnection) -> Result<Self, DialError> {
        let host = resolve_host(spec, std::env::var("DOCKER_HOST").ok());
        Self::with_host(host)
    }

    pub fn with_host(host: impl Into<String>) -> Result<Self, DialError> {
        let host = host.into();
        let endpoint = parse_host(&host)?;
        Ok(Self { host, endpoint })
    }

    /// Query the engine version
    pub async fn version(&self) -> Result<EngineVersion, DialError> {
        let body = self.get("/version").await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get(&self, path: &str) -> Result<Bytes, DialError> {
        let request = Request::get(path)
            .header(hyper::header::HOST, "docker")
            .body(Empty::<Bytes>::new())?;

        debug!("GET {} on Docker engine {}", path, self.host);

        let response = match &self.endpoint {
            Endpoint::Tcp(addr) => {
                let stream = TcpStream::connect(addr).await.map_err(|source| self.io_error(source))?;
                send(stream, request).await?
            }
            #[cfg(unix)]
            Endpoint::Unix(socket) => {
                let stream = tokio::net::UnixStream::connect(socket)
                    .await
                    .map_err(|source| self.io_error(source))?;
                send(stream, request).await?
            }
            #[cfg(not(unix))]
            Endpoint::Unix(_) => return Err(DialError::UnsupportedHost(self.host.clone())),
        };

        let status = response.status();
        let body = response.into_body().collect().await?.to_bytes();
        if !status.is_success() {
            return Err(DialError::EngineStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).trim().to_string(),
            });
        }
        Ok(body)
    }

    fn io_error(&self, source: std::io::Error) -> DialError {
        DialError::Io {
            host: self.host.clone(),
            source,
        }
    }
}

impl ContainerClient for DockerClient {
    fn host(&self) -> &str {
        &self.host
    }
}

async fn send<S>(stream: S, request: Request<Empty<Bytes>>) -> Result<Response<Incoming>, DialError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream)).await?;
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            debug!("Docker engine connection closed: {}", e);
        }
    });
    Ok(sender.send_request(request).await?)
}

fn resolve_host(spec: &DockerClusterConnection, env_host: Option<String>) -> String {
    spec.host
        .clone()
        .filter(|host| !host.is_empty())
        .or_else(|| env_host.filter(|host| !host.is_empty()))
        .unwrap_or_else(|| DEFAULT_DOCKER_HOST.to_string())
}

fn parse_host(host: &str) -> Result<Endpoint, DialError> {
    if let Some(path) = host.strip_prefix("unix://") {
        return Ok(Endpoint::Unix(PathBuf::from(path)));
    }

    let addr = host
        .strip_prefix("tcp://")
        .or_else(|| host.strip_prefix("http://"))
        .map(|rest| rest.trim_end_matches('/'))
        .filter(|addr| !addr.is_empty())
        .ok_or_else(|| DialError::UnsupportedHost(host.to_string()))?;
    Ok(Endpoint::Tcp(addr.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;
    use hyper::server::conn::http1;
    use hyper::service::service_fn;
    use hyper::StatusCode;
    use std::convert::Infallible;
    use tokio::net::TcpListener;

    #[test]
    fn test_resolve_host_precedence() {
        let spec = DockerClusterConnection {
            host: Some("tcp://10.0.0.5:2375".to_string()),
        };
        assert_eq!(
            resolve_host(&spec, Some("unix:///tmp/other.sock".to_string())),
            "tcp://10.0.0.5:2375"
        );

        let spec = DockerClusterConnection::default();
        assert_eq!(
            resolve_host(&spec, Some("unix:///tmp/other.sock".to_string())),
            "unix:///tmp/other.sock"
        );
        assert_eq!(resolve_host(&spec, Some(String::new())), DEFAULT_DOCKER_HOST);
        assert_eq!(resolve_host(&spec, None), DEFAULT_DOCKER_HOST);
    }

    #[test]
    fn test_parse_host() {
        assert_eq!(
            parse_host("unix:///var/run/docker.sock").unwrap(),
            Endpoint::Unix(PathBuf::from("/var/run/docker.sock"))
        );
        assert_eq!(
            parse_host("tcp://10.0.0.5:2375").unwrap(),
            Endpoint::Tcp("10.0.0.5:2375".to_string())
        );
        assert_eq!(
            parse_host("http://localhost:2375/").unwrap(),
            Endpoint::Tcp("localhost:2375".to_string())
        );
        assert!(matches!(
            parse_host("ssh://user@remote"),
            Err(DialError::UnsupportedHost(_))
        ));
        assert!(matches!(parse_host("tcp://"), Err(DialError::UnsupportedHost(_))));
    }

    #[test]
    fn test_env_for_subprocesses() {
        let client = DockerClient::with_host("tcp://10.0.0.5:2375").unwrap();
        assert_eq!(
            client.env(),
            vec![("DOCKER_HOST".to_string(), "tcp://10.0.0.5:2375".to_string())]
        );
    }

    async fn serve_once(status: StatusCode, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let service = service_fn(move |req: Request<Incoming>| async move {
                assert_eq!(req.uri().path(), "/version");
                Ok::<_, Infallible>(
                    Response::builder()
                        .status(status)
                        .body(Full::new(Bytes::from(body)))
                        .unwrap(),
                )
            });
            let _ = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .await;
        });

        format!("tcp://{}", addr)
    }

    #[tokio::test]
    async fn test_version_from_engine() {
        let host = serve_once(
            StatusCode::OK,
            r#"{"Version":"27.1.1","ApiVersion":"1.46","Os":"linux","Arch":"arm64"}"#,
        )
        .await;

        let client = DockerClient::with_host(host).unwrap();
        let version = client.version().await.unwrap();
        assert_eq!(version.version, "27.1.1");
        assert_eq!(version.api_version, "1.46");
        assert_eq!(version.arch, "arm64");
    }

    #[tokio::test]
    async fn test_engine_error_status() {
        let host = serve_once(StatusCode::INTERNAL_SERVER_ERROR, "daemon is starting\n").await;

        let client = DockerClient::with_host(host).unwrap();
        let err = client.version().await.unwrap_err();
        assert_eq!(err.to_string(), "Docker engine returned 500: daemon is starting");
    }

    #[tokio::test]
    async fn test_unreachable_engine() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = DockerClient::with_host(format!("tcp://{}", addr)).unwrap();
        let err = client.version().await.unwrap_err();
        assert!(matches!(err, DialError::Io { .. }));
        assert!(err.to_string().starts_with(&format!("connecting to Docker engine at tcp://{}", addr)));
    }
}
