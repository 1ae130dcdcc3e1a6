//! Listener, middleware and graceful shutdown.

use std::time::Duration;

use axum::Router;
use axum::http::{Method, header::CONTENT_TYPE};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use tiffin_core::ServiceState;

use crate::routes::build_router;
use crate::state::AppState;

/// Adds request tracing and CORS to the API router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Serves the API on `address` until a shutdown signal arrives.
pub async fn serve(state: AppState, address: &str) -> std::io::Result<()> {
    let service = state.service.clone();
    service.set_state(ServiceState::Starting);

    let listener = match TcpListener::bind(address).await {
        Ok(listener) => listener,
        Err(e) => {
            service.set_state(ServiceState::Failed(e.to_string()));
            return Err(e);
        }
    };
    tracing::info!(address = %listener.local_addr()?, "Tiffin API listening");
    service.set_state(ServiceState::Ready);

    let stopping = service.clone();
    let result = axum::serve(listener, app(state))
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            stopping.set_state(ServiceState::Stopping);
        })
        .await;

    match &result {
        Ok(()) => service.set_state(ServiceState::Stopped),
        Err(e) => service.set_state(ServiceState::Failed(e.to_string())),
    }
    tracing::info!("Tiffin API stopped");
    result
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
