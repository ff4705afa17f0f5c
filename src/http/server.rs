//! HTTP server startup logic.

use std::io;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::HttpServerConfig;

use super::shutdown;

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Port {port} is in use. Set PORT or free it.")]
    PortInUse { port: u16 },

    #[error("Failed to bind server: {0}")]
    Bind(io::Error),

    #[error("Server error: {0}")]
    Server(io::Error),
}

impl ServerError {
    /// Classify a bind failure, singling out an occupied port.
    pub fn from_bind(err: io::Error, port: u16) -> Self {
        if err.kind() == io::ErrorKind::AddrInUse {
            ServerError::PortInUse { port }
        } else {
            ServerError::Bind(err)
        }
    }
}

/// Bind the configured address. `host` may be an IP literal or a hostname.
pub async fn bind_listener(config: &HttpServerConfig) -> Result<TcpListener, ServerError> {
    TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|e| ServerError::from_bind(e, config.port))
}

/// Bind the listener and serve `app` until a shutdown signal arrives.
///
/// This function blocks until the server shuts down.
pub async fn start_server(app: Router, config: &HttpServerConfig) -> Result<(), ServerError> {
    let listener = bind_listener(config).await?;
    let addr = listener.local_addr().map_err(ServerError::Bind)?;

    tracing::info!(%addr, host = %config.host, "Server listening on http://localhost:{}", addr.port());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::shutdown_signal())
        .await
        .map_err(ServerError::Server)?;

    tracing::info!("Server stopped");
    Ok(())
}
