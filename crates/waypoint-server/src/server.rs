//! HTTP and HTTPS listeners.
//!
//! A [`Server`] shares one [`Router`] between every listener it runs. Each
//! accepted connection gets its own task. Request bodies are buffered up to
//! the server's body limit, then the router's CORS policy and dispatch run
//! on the blocking thread pool, since handlers are synchronous.
//!
//! # Example
//!
//! ```rust,ignore
//! use waypoint_server::{Router, Server, ShutdownSignal};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let router = Router::new();
//!     Server::new(router)
//!         .with_shutdown(ShutdownSignal::on_ctrl_c())
//!         .listen_with_tls(":8080", ":8443", "cert.pem", "key.pem")
//!         .await?;
//!     Ok(())
//! }
//! ```

use std::convert::Infallible;
use std::io::Write;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use http::header::{HeaderValue, HOST, LOCATION};
use http::StatusCode;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tracing::{debug, error, info, warn};
use waypoint_telemetry::{Category, LogWriter};

use crate::error::{ServerError, ServerResult};
use crate::handler::{Request, Response};
use crate::response::{empty, plain_text};
use crate::router::Router;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};
use crate::tls::load_acceptor;

/// How long open connections get to finish after shutdown.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest request body buffered before dispatch (1 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// What a listener does with requests.
#[derive(Debug)]
enum Mode {
    /// Dispatch through the router.
    App,
    /// Redirect to HTTPS on the given `:port` suffix.
    Redirect { tls_port: String },
}

/// Runs listeners for a [`Router`].
#[derive(Debug, Clone)]
pub struct Server {
    router: Arc<Router>,
    shutdown: ShutdownSignal,
    shutdown_timeout: Duration,
    max_body_size: usize,
}

impl Server {
    /// A server for `router`, stopped by [`Server::shutdown_signal`].
    #[must_use]
    pub fn new(router: Router) -> Self {
        Self::from_shared(Arc::new(router))
    }

    /// A server for an already shared router.
    #[must_use]
    pub fn from_shared(router: Arc<Router>) -> Self {
        Self {
            router,
            shutdown: ShutdownSignal::new(),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }

    /// Stops every listener when `shutdown` fires.
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// How long to wait for open connections after shutdown.
    #[must_use]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Largest request body accepted. Larger bodies are answered with `413`
    /// before reaching the router.
    #[must_use]
    pub fn max_body_size(mut self, limit: usize) -> Self {
        self.max_body_size = limit;
        self
    }

    /// The signal stopping this server.
    #[must_use]
    pub fn shutdown_signal(&self) -> &ShutdownSignal {
        &self.shutdown
    }

    /// The router serving requests.
    #[must_use]
    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Serves plain HTTP on `addr` until shutdown.
    ///
    /// `addr` may omit the host (`":8080"`) to listen on every interface.
    pub async fn listen(&self, addr: &str) -> ServerResult<()> {
        let listener = bind(addr).await?;
        self.serve(listener).await
    }

    /// Serves plain HTTP on an already bound listener.
    pub async fn serve(&self, listener: TcpListener) -> ServerResult<()> {
        self.run(listener, None, Mode::App).await
    }

    /// Serves HTTPS on `addr` with a PEM certificate chain and key.
    pub async fn listen_tls(&self, addr: &str, cert: impl AsRef<Path>, key: impl AsRef<Path>) -> ServerResult<()> {
        let acceptor = load_acceptor(cert, key)?;
        let listener = bind(addr).await?;
        self.serve_tls(listener, acceptor).await
    }

    /// Serves HTTPS on an already bound listener.
    pub async fn serve_tls(&self, listener: TcpListener, acceptor: TlsAcceptor) -> ServerResult<()> {
        self.run(listener, Some(acceptor), Mode::App).await
    }

    /// Serves the application over HTTPS on `addr_tls` while `addr` answers
    /// every request with a permanent redirect to the HTTPS listener.
    pub async fn listen_with_tls(
        &self,
        addr: &str,
        addr_tls: &str,
        cert: impl AsRef<Path>,
        key: impl AsRef<Path>,
    ) -> ServerResult<()> {
        let acceptor = load_acceptor(cert, key)?;
        let http = bind(addr).await?;
        let https = bind(addr_tls).await?;

        tokio::try_join!(
            self.serve_redirect(http, port_suffix(addr_tls)),
            self.serve_tls(https, acceptor),
        )?;
        Ok(())
    }

    /// Redirects every request on `listener` to `https://{host}{tls_port}`.
    ///
    /// `tls_port` is a `":port"` suffix; empty means the default port.
    pub async fn serve_redirect(&self, listener: TcpListener, tls_port: impl Into<String>) -> ServerResult<()> {
        let mode = Mode::Redirect {
            tls_port: tls_port.into(),
        };
        self.run(listener, None, mode).await
    }

    async fn run(&self, listener: TcpListener, tls: Option<TlsAcceptor>, mode: Mode) -> ServerResult<()> {
        let local = listener.local_addr()?;
        info!(addr = %local, tls = tls.is_some(), mode = ?mode, "listening");

        let mode = Arc::new(mode);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, remote) = match accepted {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            error!(addr = %local, error = %e, "failed to accept connection");
                            continue;
                        }
                    };

                    let connection = Connection {
                        router: Arc::clone(&self.router),
                        mode: Arc::clone(&mode),
                        shutdown: self.shutdown.clone(),
                        remote,
                        max_body_size: self.max_body_size,
                    };
                    let token = tracker.acquire();
                    let tls = tls.clone();

                    tokio::spawn(async move {
                        let _token = token;
                        match tls {
                            Some(acceptor) => match acceptor.accept(stream).await {
                                Ok(stream) => connection.serve(stream).await,
                                Err(e) => debug!(remote = %remote, error = %e, "TLS handshake failed"),
                            },
                            None => connection.serve(stream).await,
                        }
                    });
                }

                () = self.shutdown.recv() => {
                    info!(addr = %local, "shutdown signal received, stopping listener");
                    break;
                }
            }
        }

        let open = tracker.active_connections();
        if open > 0 {
            info!(addr = %local, open, timeout = ?self.shutdown_timeout, "waiting for connections to close");
        }

        tokio::select! {
            () = tracker.wait_idle() => debug!(addr = %local, "all connections closed"),
            () = tokio::time::sleep(self.shutdown_timeout) => {
                warn!(addr = %local, open = tracker.active_connections(), "shutdown timeout reached");
            }
        }

        info!(addr = %local, "listener stopped");
        Ok(())
    }
}

/// One accepted connection.
#[derive(Clone)]
struct Connection {
    router: Arc<Router>,
    mode: Arc<Mode>,
    shutdown: ShutdownSignal,
    remote: SocketAddr,
    max_body_size: usize,
}

impl Connection {
    async fn serve<S>(self, stream: S)
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let remote = self.remote;
        let shutdown = self.shutdown.clone();
        let service = service_fn(move |req: http::Request<Incoming>| {
            let connection = self.clone();
            async move { Ok::<_, Infallible>(connection.handle(req).await) }
        });

        let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
        tokio::pin!(conn);

        let result = tokio::select! {
            result = conn.as_mut() => result,
            () = shutdown.recv() => {
                conn.as_mut().graceful_shutdown();
                conn.as_mut().await
            }
        };

        if let Err(e) = result {
            let mut sink = LogWriter::new(Category::Tagged("HTTP"));
            if let Err(write_error) = writeln!(sink, "connection from {remote}: {e}") {
                warn!(remote = %remote, error = %e, sink_error = %write_error, "connection error");
            }
        }
    }

    async fn handle(&self, req: http::Request<Incoming>) -> Response {
        let (parts, body) = req.into_parts();
        let body = match Limited::new(body, self.max_body_size).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
                warn!(remote = %self.remote, limit = self.max_body_size, "request body too large");
                return plain_text(StatusCode::PAYLOAD_TOO_LARGE, "Request Entity Too Large");
            }
            Err(e) => {
                warn!(remote = %self.remote, error = %e, "failed to read request body");
                return plain_text(StatusCode::BAD_REQUEST, "Bad Request");
            }
        };
        let req = Request::from_parts(parts, body);

        match self.mode.as_ref() {
            Mode::App => {
                let router = Arc::clone(&self.router);
                let dispatch = tokio::task::spawn_blocking(move || {
                    router.cors_policy().handle(req, |req| router.dispatch(req))
                });
                dispatch.await.unwrap_or_else(|e| {
                    error!(remote = %self.remote, error = %e, "dispatch task failed");
                    plain_text(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                })
            }
            Mode::Redirect { tls_port } => self.router.cors_policy().handle(req, |req| redirect(&req, tls_port)),
        }
    }
}

async fn bind(addr: &str) -> ServerResult<TcpListener> {
    if addr.is_empty() {
        return Err(ServerError::InvalidAddress {
            addr: addr.to_string(),
            reason: "empty address".to_string(),
        });
    }
    if !addr.contains(':') {
        return Err(ServerError::InvalidAddress {
            addr: addr.to_string(),
            reason: "missing port".to_string(),
        });
    }

    let target = if addr.starts_with(':') {
        format!("0.0.0.0{addr}")
    } else {
        addr.to_string()
    };
    TcpListener::bind(target.as_str())
        .await
        .map_err(|e| ServerError::bind(addr, e))
}

/// The `":port"` suffix of a listen address, or empty if it has none.
fn port_suffix(addr: &str) -> String {
    match addr.rfind(':') {
        Some(i) if !addr[i + 1..].is_empty() && !addr.ends_with(']') => addr[i..].to_string(),
        _ => String::new(),
    }
}

/// The host of a request without its port.
fn request_host(req: &Request) -> Option<&str> {
    let host = req
        .headers()
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| req.uri().host())?;

    if let Some(end) = host.strip_prefix('[').and_then(|rest| rest.find(']')) {
        return Some(&host[..end + 2]);
    }
    host.split(':').next().filter(|h| !h.is_empty())
}

fn redirect(req: &Request, tls_port: &str) -> Response {
    let Some(host) = request_host(req) else {
        return plain_text(StatusCode::BAD_REQUEST, "Bad Request: missing host");
    };
    let target = req.uri().path_and_query().map_or("/", |pq| pq.as_str());
    let location = format!("https://{host}{tls_port}{target}");

    match HeaderValue::from_str(&location) {
        Ok(value) => {
            let mut response = empty(StatusCode::MOVED_PERMANENTLY);
            response.headers_mut().insert(LOCATION, value);
            response
        }
        Err(_) => plain_text(StatusCode::BAD_REQUEST, "Bad Request"),
    }
}

impl Router {
    /// Serves plain HTTP on `addr` until Ctrl-C.
    pub async fn listen(self, addr: &str) -> ServerResult<()> {
        Server::new(self)
            .with_shutdown(ShutdownSignal::on_ctrl_c())
            .listen(addr)
            .await
    }

    /// Serves HTTPS on `addr` until Ctrl-C.
    pub async fn listen_tls(self, addr: &str, cert: impl AsRef<Path>, key: impl AsRef<Path>) -> ServerResult<()> {
        Server::new(self)
            .with_shutdown(ShutdownSignal::on_ctrl_c())
            .listen_tls(addr, cert, key)
            .await
    }

    /// Serves HTTPS on `addr_tls` and redirects HTTP on `addr` until Ctrl-C.
    pub async fn listen_with_tls(
        self,
        addr: &str,
        addr_tls: &str,
        cert: impl AsRef<Path>,
        key: impl AsRef<Path>,
    ) -> ServerResult<()> {
        Server::new(self)
            .with_shutdown(ShutdownSignal::on_ctrl_c())
            .listen_with_tls(addr, addr_tls, cert, key)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cors::Cors;
    use crate::handler::handler;
    use bytes::Bytes;
    use http::Method;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use waypoint_core::Outcome;

    fn request(uri: &str, host: Option<&str>) -> Request {
        let mut builder = http::Request::builder().uri(uri);
        if let Some(host) = host {
            builder = builder.header(HOST, host);
        }
        builder.body(Bytes::new()).unwrap()
    }

    async fn raw_get(addr: SocketAddr, path: &str, extra: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {path} HTTP/1.1\r\nHost: localhost:{}\r\n{extra}Connection: close\r\n\r\n", addr.port());
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        String::from_utf8(response).unwrap()
    }

    fn app() -> Router {
        let mut router = Router::new();
        router
            .cors(Cors::permissive())
            .route(Method::GET, handler(|_, _| Outcome::text_ok(StatusCode::OK, "pong")), "/ping", &[])
            .route(Method::GET, handler(|_, _| panic!("boom")), "/x", &[]);
        router
    }

    #[test]
    fn test_port_suffix() {
        assert_eq!(port_suffix(":8443"), ":8443");
        assert_eq!(port_suffix("127.0.0.1:8443"), ":8443");
        assert_eq!(port_suffix("[::1]:8443"), ":8443");
        assert_eq!(port_suffix("localhost"), "");
    }

    #[test]
    fn test_redirect_location() {
        let response = redirect(&request("/a/b?c=d", Some("example.com:8080")), ":8443");
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "https://example.com:8443/a/b?c=d");

        let response = redirect(&request("/", Some("[::1]:8080")), ":8443");
        assert_eq!(response.headers().get(LOCATION).unwrap(), "https://[::1]:8443/");

        let response = redirect(&request("/", None), ":8443");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_addresses() {
        assert!(matches!(bind("").await, Err(ServerError::InvalidAddress { .. })));
        assert!(matches!(bind("localhost").await, Err(ServerError::InvalidAddress { .. })));
    }

    #[tokio::test]
    async fn test_serve_and_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = Server::new(app()).shutdown_timeout(Duration::from_millis(200));
        let shutdown = server.shutdown_signal().clone();

        let task = tokio::spawn(async move { server.serve(listener).await });

        let response = raw_get(addr, "/ping", "").await;
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.ends_with("pong"));

        let response = raw_get(addr, "/x", "").await;
        assert!(response.starts_with("HTTP/1.1 500"));
        assert!(response.contains("/x"));

        let response = raw_get(addr, "/ping", "Origin: https://app.example\r\n").await;
        assert!(response.contains("access-control-allow-origin: https://app.example"));

        shutdown.trigger();
        let result = tokio::time::timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_blocking_handlers_do_not_stall_the_runtime() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let barrier = Arc::new(std::sync::Barrier::new(2));
        let mut router = Router::new();
        for path in ["/left", "/right"] {
            let barrier = Arc::clone(&barrier);
            router.route(
                Method::GET,
                handler(move |_, _| {
                    barrier.wait();
                    Outcome::text_ok(StatusCode::OK, "met")
                }),
                path,
                &[],
            );
        }
        let server = Server::new(router).shutdown_timeout(Duration::from_millis(200));
        let shutdown = server.shutdown_signal().clone();
        let task = tokio::spawn(async move { server.serve(listener).await });

        let (left, right) = tokio::time::timeout(
            Duration::from_secs(5),
            async { tokio::join!(raw_get(addr, "/left", ""), raw_get(addr, "/right", "")) },
        )
        .await
        .unwrap();
        assert!(left.ends_with("met"));
        assert!(right.ends_with("met"));

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), task).await.unwrap().unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let mut router = Router::new();
        router.route(
            Method::POST,
            handler(|req, _| Outcome::text_ok(StatusCode::OK, format!("{} bytes", req.body().len()))),
            "/upload",
            &[],
        );
        let server = Server::new(router)
            .max_body_size(8)
            .shutdown_timeout(Duration::from_millis(200));
        let shutdown = server.shutdown_signal().clone();
        let task = tokio::spawn(async move { server.serve(listener).await });

        let post = move |body: &'static str| async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            let request = format!(
                "POST /upload HTTP/1.1\r\nHost: localhost\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(request.as_bytes()).await.unwrap();
            let mut response = Vec::new();
            stream.read_to_end(&mut response).await.unwrap();
            String::from_utf8(response).unwrap()
        };

        let response = post("tiny").await;
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.ends_with("4 bytes"));

        let response = post("far more than eight bytes").await;
        assert!(response.starts_with("HTTP/1.1 413"));

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), task).await.unwrap().unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_redirect_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = Server::new(Router::new()).shutdown_timeout(Duration::from_millis(200));
        let shutdown = server.shutdown_signal().clone();

        let task = tokio::spawn(async move { server.serve_redirect(listener, ":8443").await });

        let response = raw_get(addr, "/login?next=%2F", "").await;
        assert!(response.starts_with("HTTP/1.1 301"));
        assert!(response.contains("location: https://localhost:8443/login?next=%2F"));

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), task).await.unwrap().unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_before_serving() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let shutdown = ShutdownSignal::new();
        shutdown.trigger();

        let server = Server::new(Router::new()).with_shutdown(shutdown);
        let result = tokio::time::timeout(Duration::from_secs(5), server.serve(listener)).await;
        assert!(result.unwrap().is_ok());
    }
}
