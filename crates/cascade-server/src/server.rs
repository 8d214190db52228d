//! HTTP serving layer.
//!
//! Binds a Cascade [`App`] to a TCP listener via Hyper: one spawned task per
//! connection, HTTP/1.1, graceful shutdown. The per-request path collects the
//! body, runs the app's dispatch loop against a fresh [`ResponseWriter`],
//! and converts the writer into the wire response. Exactly one response is
//! produced per request, with errors fully absorbed by the dispatcher.
//!
//! # Example
//!
//! ```rust,ignore
//! use cascade_core::{App, Flow};
//! use cascade_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut app = App::new();
//!     app.use_fn(|_req, res| {
//!         res.send("hello");
//!         Ok(Flow::Halt)
//!     });
//!
//!     Server::builder()
//!         .app(app)
//!         .http_addr("0.0.0.0:8080")
//!         .build()
//!         .run()
//!         .await?;
//!     Ok(())
//! }
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use http::StatusCode;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::TcpListener;

use cascade_core::{App, Response, ResponseWriter};

use crate::config::{ServerConfig, ServerConfigBuilder, DEFAULT_SHUTDOWN_TIMEOUT_SECS};
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Server error types.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the configured address.
    #[error("bind error: {0}")]
    Bind(String),

    /// I/O error during server operation.
    #[error("i/o error: {0}")]
    Io(String),
}

/// The Cascade HTTP server.
///
/// Owns the application and serves it until shutdown.
pub struct Server {
    config: ServerConfig,
    app: Arc<App>,
}

impl Server {
    /// Creates a new server for the given application and configuration.
    #[must_use]
    pub fn new(app: App, config: ServerConfig) -> Self {
        Self {
            config,
            app: Arc::new(app),
        }
    }

    /// Creates a new server builder.
    #[must_use]
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Returns a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Runs the server until SIGTERM or SIGINT is received.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot bind to the configured address.
    pub async fn run(self) -> Result<(), ServerError> {
        let shutdown = ShutdownSignal::with_os_signals();
        self.run_with_shutdown(shutdown).await
    }

    /// Runs the server with a custom shutdown signal.
    ///
    /// Useful for tests or programmatic shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot bind to the configured address.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self.config.socket_addr().map_err(|e| {
            ServerError::Bind(format!(
                "invalid address '{}': {e}",
                self.config.http_addr()
            ))
        })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(format!("failed to bind to {addr}: {e}")))?;

        tracing::info!(%addr, "server listening");
        accept_loop(listener, self.app, shutdown, self.config.shutdown_timeout()).await;
        tracing::info!("server stopped");
        Ok(())
    }
}

/// Builder for configuring and creating a [`Server`].
#[derive(Default)]
pub struct ServerBuilder {
    config_builder: ServerConfigBuilder,
    app: Option<App>,
}

impl ServerBuilder {
    /// Creates a new server builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the application to serve.
    #[must_use]
    pub fn app(mut self, app: App) -> Self {
        self.app = Some(app);
        self
    }

    /// Sets the HTTP bind address.
    #[must_use]
    pub fn http_addr(mut self, addr: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.http_addr(addr);
        self
    }

    /// Sets the graceful shutdown timeout.
    #[must_use]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.shutdown_timeout(timeout);
        self
    }

    /// Builds the server. An unset application defaults to an empty one,
    /// which answers every request with 404.
    #[must_use]
    pub fn build(self) -> Server {
        Server {
            config: self.config_builder.build(),
            app: Arc::new(self.app.unwrap_or_default()),
        }
    }
}

/// A handle to a server started with [`listen`].
///
/// Exposes the bound address (useful with port 0) and programmatic shutdown.
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: ShutdownSignal,
    task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Returns the address the server is bound to.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Triggers graceful shutdown. Idempotent.
    pub fn shutdown(&self) {
        self.shutdown.trigger();
    }

    /// Waits for the server task to finish.
    pub async fn stopped(self) {
        if let Err(err) = self.task.await {
            tracing::error!(error = %err, "server task failed");
        }
    }
}

/// Binds the application to `addr` and starts serving in the background.
///
/// The convenience entry point mirroring `Server::run` for callers that want
/// the server out of the way: the listener is bound before this returns, so
/// `addr` may use port 0 and the real port read from the handle.
///
/// # Errors
///
/// Returns an error if `addr` does not parse or the listener cannot bind.
///
/// # Example
///
/// ```rust,ignore
/// let handle = cascade_server::listen(app, "127.0.0.1:0").await?;
/// println!("listening on {}", handle.local_addr());
/// handle.shutdown();
/// handle.stopped().await;
/// ```
pub async fn listen(app: App, addr: impl Into<String>) -> Result<ServerHandle, ServerError> {
    let addr = addr.into();
    let socket: SocketAddr = addr
        .parse()
        .map_err(|e| ServerError::Bind(format!("invalid address '{addr}': {e}")))?;

    let listener = TcpListener::bind(socket)
        .await
        .map_err(|e| ServerError::Bind(format!("failed to bind to {socket}: {e}")))?;

    let local_addr = listener
        .local_addr()
        .map_err(|e| ServerError::Io(e.to_string()))?;

    tracing::info!(%local_addr, "server listening");

    let shutdown = ShutdownSignal::new();
    let task = tokio::spawn(accept_loop(
        listener,
        Arc::new(app),
        shutdown.clone(),
        Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
    ));

    Ok(ServerHandle {
        local_addr,
        shutdown,
        task,
    })
}

/// Accepts connections until shutdown, then drains in-flight ones.
async fn accept_loop(
    listener: TcpListener,
    app: Arc<App>,
    shutdown: ShutdownSignal,
    shutdown_timeout: Duration,
) {
    let tracker = ConnectionTracker::new();

    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, remote_addr)) => {
                        let app = Arc::clone(&app);
                        let guard = tracker.acquire();
                        let shutdown = shutdown.clone();

                        tokio::spawn(async move {
                            handle_connection(stream, remote_addr, app, shutdown).await;
                            drop(guard);
                        });
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "failed to accept connection");
                    }
                }
            }

            _ = shutdown.recv() => {
                tracing::info!("shutdown signal received, stopping server");
                break;
            }
        }
    }

    tracing::info!(
        active = tracker.active_connections(),
        "waiting for connections to close"
    );

    tokio::select! {
        _ = tracker.drained() => {
            tracing::info!("all connections closed");
        }
        _ = tokio::time::sleep(shutdown_timeout) => {
            tracing::warn!(
                active = tracker.active_connections(),
                "shutdown timeout reached with connections still active"
            );
        }
    }
}

/// Serves a single connection.
async fn handle_connection(
    stream: tokio::net::TcpStream,
    remote_addr: SocketAddr,
    app: Arc<App>,
    shutdown: ShutdownSignal,
) {
    let io = TokioIo::new(stream);

    let service = service_fn(move |req: http::Request<Incoming>| {
        let app = Arc::clone(&app);
        async move { handle_request(&app, req).await }
    });

    let conn = http1::Builder::new().serve_connection(io, service);

    tokio::select! {
        result = conn => {
            if let Err(err) = result {
                tracing::error!(remote = %remote_addr, error = %err, "connection error");
            }
        }
        _ = shutdown.recv() => {
            tracing::debug!(remote = %remote_addr, "connection closed due to shutdown");
        }
    }
}

/// Handles one HTTP request: collect the body, dispatch, convert the writer.
async fn handle_request(
    app: &App,
    req: http::Request<Incoming>,
) -> Result<Response, Infallible> {
    tracing::debug!(method = %req.method(), path = %req.uri().path(), "incoming request");

    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            tracing::error!(error = %err, "failed to collect request body");
            let mut res = ResponseWriter::new();
            res.set_status(StatusCode::BAD_REQUEST);
            res.end();
            return Ok(res.into_response());
        }
    };

    let request = http::Request::from_parts(parts, body);
    let mut res = ResponseWriter::new();
    app.handle(&request, &mut res).await;
    Ok(res.into_response())
}
