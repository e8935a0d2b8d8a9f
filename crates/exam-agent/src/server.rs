//! HTTP server wiring.

use crate::auth::AllowList;
use crate::handlers::{healthz_handler, instance_handler, template_handler};
use crate::store::ResourceStore;
use anyhow::Result;
use axum::{routing::any, Router};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

/// State shared by every handler
pub struct ServerState {
    /// Store holding instances and templates
    pub store: Arc<dyn ResourceStore>,
    /// Namespace every lookup is scoped to
    pub namespace: String,
    /// Addresses allowed to create, update and delete instances
    pub allow_list: AllowList,
}

impl ServerState {
    pub fn new(store: Arc<dyn ResourceStore>, namespace: impl Into<String>, allow_list: AllowList) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            allow_list,
        }
    }
}

/// Build the HTTP router.
pub fn build_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/healthz", any(healthz_handler))
        .route("/instance/{*name}", any(instance_handler))
        .route("/template", any(template_handler))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        )
        .with_state(state)
}

/// Serves requests on `listener` until `shutdown` resolves.
///
/// Handlers receive the peer socket address for the allowlist check.
pub async fn serve<F>(listener: TcpListener, state: Arc<ServerState>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;

    Ok(())
}

/// Binds `addr` and serves until SIGINT or SIGTERM.
pub async fn run_server(state: Arc<ServerState>, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Exam agent listening on {}", listener.local_addr()?);

    serve(listener, state, shutdown_signal()).await?;

    info!("Exam agent stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully");
        },
        () = terminate => {
            info!("Received SIGTERM, shutting down gracefully");
        },
    }
}
