//! # Web API
//!
//! Thin axum shim over the analyst: one route per operation, JSON in and out.

pub mod errors;
pub mod handlers;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::bootstrap::AnalystSystem;
use crate::error::Result;

pub use errors::{ApiError, ApiResult};
pub use state::AppState;

/// Build the router with every route mounted
pub fn create_app(state: AppState) -> Router {
    let enable_cors = state.system().config().web.enable_cors;

    let router = Router::new()
        .route("/health", get(handlers::health::basic_health))
        .route("/api/ask", post(handlers::analyst::ask_question))
        .route("/api/stats", get(handlers::analyst::get_stats))
        .route(
            "/api/reset",
            get(handlers::analyst::reset_session).post(handlers::analyst::reset_session),
        )
        .route("/api/database/tables", get(handlers::database::list_tables))
        .route(
            "/api/database/table/:table_name",
            get(handlers::database::table_schema),
        )
        .route(
            "/api/database/data/:table_name",
            get(handlers::database::table_data),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Serve until Ctrl-C
pub async fn serve(system: Arc<AnalystSystem>, bind_address: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    info!(bind_address = %bind_address, "🌐 HTTP server listening");

    let app = create_app(AppState::new(system));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
