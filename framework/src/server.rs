use crate::config::{Config, ServerConfig};
use crate::error::FrameworkError;
use crate::http::{collect_body, HttpKernel, HttpResponse, Request};
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// HTTP/1 server: one tokio task per connection, one shared kernel
pub struct Server {
    kernel: Arc<HttpKernel>,
    config: ServerConfig,
}

impl Server {
    pub fn new(kernel: HttpKernel) -> Self {
        Self {
            kernel: Arc::new(kernel),
            config: ServerConfig::default(),
        }
    }

    /// Use the `server` config section for address and body limit
    pub fn from_config(kernel: HttpKernel) -> Self {
        Self {
            kernel: Arc::new(kernel),
            config: Config::server(),
        }
    }

    pub fn host(mut self, host: &str) -> Self {
        self.config.host = host.to_string();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn max_body_size(mut self, bytes: usize) -> Self {
        self.config.max_body_size = bytes;
        self
    }

    /// Serve until Ctrl+C
    pub async fn run(self) -> Result<(), FrameworkError> {
        self.run_until(shutdown_signal()).await
    }

    /// Serve until `shutdown` completes
    ///
    /// Stops accepting new connections once `shutdown` resolves; connections
    /// already accepted finish on their own tasks.
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) -> Result<(), FrameworkError> {
        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port))
            .await
            .map_err(|e| {
                FrameworkError::internal(format!(
                    "Failed to bind {}: {}",
                    self.config.address(),
                    e
                ))
            })?;
        let addr = listener.local_addr()?;
        tracing::info!(%addr, routes = self.kernel.routes().len(), "Ember server running on http://{}", addr);

        let limit = self.config.max_body_size;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            tracing::warn!(error = %e, "failed to accept connection");
                            continue;
                        }
                    };
                    serve_connection(self.kernel.clone(), stream, peer, limit);
                }
                _ = &mut shutdown => {
                    tracing::info!("shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }

        Ok(())
    }
}

fn serve_connection(
    kernel: Arc<HttpKernel>,
    stream: tokio::net::TcpStream,
    peer: SocketAddr,
    limit: usize,
) {
    let io = TokioIo::new(stream);
    tokio::spawn(async move {
        let service = service_fn(move |req: hyper::Request<Incoming>| {
            let kernel = kernel.clone();
            async move { Ok::<_, Infallible>(handle_request(&kernel, req, limit).await) }
        });

        if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
            tracing::debug!(%peer, error = %err, "error serving connection");
        }
    });
}

async fn handle_request(
    kernel: &HttpKernel,
    req: hyper::Request<Incoming>,
    limit: usize,
) -> hyper::Response<Full<Bytes>> {
    let (parts, body) = req.into_parts();
    let bytes = match collect_body(body, limit).await {
        Ok(bytes) => bytes,
        Err(e) => return HttpResponse::from(e).into_hyper(),
    };

    let request = Request::new(http::Request::from_parts(parts, bytes));
    kernel.handle(request).await.into_hyper()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C, serving until killed");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::MiddlewareRegistry;
    use crate::routing::Router;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    async fn echo(req: Request) -> crate::http::Response {
        Ok(HttpResponse::text(String::from_utf8_lossy(req.body()).to_string()))
    }

    async fn roundtrip(addr: SocketAddr, raw: &str) -> String {
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream.write_all(raw.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_serves_requests_and_enforces_body_limit() {
        let routes = Router::new().post("/echo", echo).compile().unwrap();
        let kernel = HttpKernel::new(routes, MiddlewareRegistry::new());

        // Reserve a free port, then hand it to the server
        let free_port = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = free_port.local_addr().unwrap();
        drop(free_port);

        let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
        let server = Server::new(kernel)
            .host("127.0.0.1")
            .port(addr.port())
            .max_body_size(8);
        let handle = tokio::spawn(server.run_until(async {
            let _ = stopped.await;
        }));
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let small = roundtrip(
            addr,
            "POST /echo HTTP/1.1\r\nHost: x\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello",
        )
        .await;
        assert!(small.starts_with("HTTP/1.1 200"));
        assert!(small.ends_with("hello"));

        let large = roundtrip(
            addr,
            "POST /echo HTTP/1.1\r\nHost: x\r\nContent-Length: 12\r\nConnection: close\r\n\r\nhello world!",
        )
        .await;
        assert!(large.starts_with("HTTP/1.1 413"));

        let _ = stop.send(());
        handle.await.unwrap().unwrap();
    }
}
