//! Route definitions.

use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builds the application router.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/tokens", get(handlers::list_tokens))
        .route("/tokens/{category}/price", get(handlers::get_token_price))
        .route("/tokens/{category}/history", get(handlers::get_token_history))
        .route("/stats/tvl-volume", get(handlers::get_tvl_volume))
        .route("/stats/volume", get(handlers::get_volume_stats))
        .route(
            "/addresses/{address}/balance-history",
            get(handlers::get_balance_history),
        )
        .route("/transactions", post(handlers::record_transaction))
        .route("/events", get(handlers::events))
        .route("/openapi.json", get(handlers::openapi_spec));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api)
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
