//! HTTP front door for batch runs.
//!
//! One endpoint:
//! - `POST /run_analysis`: body is a user override document (JSON); runs the
//!   full pipeline and answers with the run summary.

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::post;

use crate::config::RunConfig;
use crate::store::BuildingStore;

pub use types::ErrorResponse;

/// Application state shared across request handlers.
///
/// Read-only after startup; every request gets its own override document.
pub struct AppState {
    /// Run configuration applied to every request.
    pub config: RunConfig,
    /// Building inventory queried with each document's filter.
    pub store: Arc<dyn BuildingStore>,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/run_analysis", post(handlers::run_analysis))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("API server listening on http://{addr}");
    axum::serve(listener, app).await
}
