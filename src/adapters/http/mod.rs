use crate::config::Config;
use crate::storage::FileStore;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub mod error;
pub mod files;
pub mod router;
pub mod tags;

pub use error::ApiError;
pub use router::{build_router, FILES_BASE_PATH};

/// Shared state handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<dyn FileStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn FileStore>) -> Self {
        Self { store }
    }
}

/// HTTP adapter
///
/// Owns the axum server for the files API.
pub struct HttpAdapter {
    pub bind_addr: SocketAddr,
    pub max_upload_bytes: usize,
}

impl HttpAdapter {
    pub fn new(bind_addr: SocketAddr, max_upload_bytes: usize) -> Self {
        Self {
            bind_addr,
            max_upload_bytes,
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(config.bind_addr()?, config.server.max_upload_bytes))
    }

    pub fn router(&self, store: Arc<dyn FileStore>) -> Router {
        build_router(AppState::new(store), self.max_upload_bytes)
    }

    /// Bind the listener and serve until `shutdown` is cancelled.
    ///
    /// Binding happens before the task is spawned so address errors reach
    /// the caller.
    pub async fn start(
        &self,
        store: Arc<dyn FileStore>,
        shutdown: CancellationToken,
    ) -> anyhow::Result<JoinHandle<()>> {
        let app = self.router(store);
        let listener = TcpListener::bind(self.bind_addr).await?;
        let bind_addr = listener.local_addr()?;

        tracing::info!("🚀 HTTP server listening on {}", bind_addr);

        Ok(tokio::spawn(async move {
            let graceful_shutdown = async move {
                shutdown.cancelled().await;
            };

            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(graceful_shutdown)
                .await
            {
                tracing::error!("HTTP server on {} encountered error: {}", bind_addr, e);
            }

            tracing::info!("HTTP server on {} shut down", bind_addr);
        }))
    }

    pub fn summary(&self) -> String {
        format!(
            "HttpAdapter(bind={}, max_upload_bytes={})",
            self.bind_addr, self.max_upload_bytes
        )
    }
}
