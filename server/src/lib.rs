//! HTTP surface for the assistant orchestrator: a single query endpoint plus
//! a health check, built the same `axum` + `tower_http` way as this
//! ecosystem's other presentation adapters.

use axum::Router;
use orchestrator::Orchestrator;
use orchestrator_core::cache::QueryResultCache;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;

pub use config::ServerConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub graph: Arc<dyn orchestrator_core::traits::GraphQueryAdapter>,
    pub cache: Arc<QueryResultCache>,
}

/// Builds the router: `POST /api/campaigns/:campaignUuid/assistant/query`,
/// an administrative cache-clear endpoint, and `/health`, with permissive
/// CORS and request tracing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", axum::routing::get(handlers::health::health_check))
        .route(
            "/api/campaigns/:campaign_uuid/assistant/query",
            axum::routing::post(handlers::assistant::handle_query),
        )
        .route(
            "/api/campaigns/:campaign_uuid/cache",
            axum::routing::delete(handlers::assistant::clear_cache),
        )
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(axum::middleware::from_fn(middleware::request_timeout))
                .layer(axum::middleware::from_fn(middleware::request_logging)),
        )
}
