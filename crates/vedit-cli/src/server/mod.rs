//! HTTP front end of the mutation service.
//!
//! Routes:
//! - `GET /ping`: liveness
//! - `POST /edit-file`: apply a batch, guarded by the `x-api-key` header
//! - `OPTIONS /edit-file`: CORS preflight against the origin allow-list

mod cors;
mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;
use vedit_config::VeditConfig;

pub use cors::OriginPolicy;

use crate::edit::EditService;
use crate::error::{CliError, Result};

/// Shared state of all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<EditService>,
    pub api_key: Arc<str>,
    pub origins: Arc<OriginPolicy>,
}

impl AppState {
    pub fn new(service: EditService, api_key: impl Into<Arc<str>>, origins: OriginPolicy) -> Self {
        Self {
            service: Arc::new(service),
            api_key: api_key.into(),
            origins: Arc::new(origins),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(routes::ping))
        .route("/edit-file", post(routes::edit_file).options(routes::preflight))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(config: &VeditConfig) -> Result<()> {
    let Some(api_key) = config.server.api_key.clone().filter(|key| !key.is_empty()) else {
        return Err(CliError::InvalidArgument(
            "An API key is required to serve edits (--api-key, VEDIT_SERVER__API_KEY or server.api_key)"
                .to_string(),
        ));
    };
    let origins = OriginPolicy::from_config(&config.server)?;
    let service = EditService::new(config);
    let root = service.root().to_path_buf();
    let app = router(AppState::new(service, api_key, origins));

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| CliError::Server(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!(root = %root.display(), git = config.vcs.enabled, "Serving edits");
    crate::ui::success(&format!("Edit server running at http://{}", addr));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| CliError::Server(e.to_string()))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
