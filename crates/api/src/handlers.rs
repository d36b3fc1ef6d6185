//! Request handlers.

use crate::error::ApiError;
use crate::models::{
    ErrorResponse, ForceQuery, HealthResponse, HistoryQuery, RangeQuery, RecordTransactionRequest,
    TokensQuery, parse_range,
};
use crate::openapi::ApiDoc;
use crate::state::AppState;
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use dex_metrics_domain::StoredTransaction;
use dex_metrics_engine::balance_replay::BalanceHistory;
use dex_metrics_engine::reports::{
    OverviewQuery, PriceHistory, TokenPrice, TokensOverview, TvlVolumeHistory, VolumeStats,
};
use futures::Stream;
use std::convert::Infallible;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};
use utoipa::OpenApi;

/// Health check.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Current market price of a token.
#[utoipa::path(
    get,
    path = "/tokens/{category}/price",
    tag = "Tokens",
    params(("category" = String, Path, description = "Token category id"), ForceQuery),
    responses(
        (status = 200, description = "Weighted price and BCH liquidity", body = TokenPrice),
        (status = 400, description = "Invalid category", body = ErrorResponse),
        (status = 500, description = "Source failure", body = ErrorResponse)
    )
)]
pub async fn get_token_price(
    State(state): State<AppState>,
    Path(category): Path<String>,
    query: Result<Query<ForceQuery>, QueryRejection>,
) -> Result<Json<TokenPrice>, ApiError> {
    let Query(query) = query?;
    let price = state.metrics.token_price(&category, query.force).await?;
    Ok(Json(price))
}

/// Token overview with search and paging.
#[utoipa::path(
    get,
    path = "/tokens",
    tag = "Tokens",
    params(TokensQuery),
    responses(
        (status = 200, description = "Tokens sorted by TVL", body = TokensOverview),
        (status = 500, description = "Source failure", body = ErrorResponse)
    )
)]
pub async fn list_tokens(
    State(state): State<AppState>,
    query: Result<Query<TokensQuery>, QueryRejection>,
) -> Result<Json<TokensOverview>, ApiError> {
    let Query(query) = query?;
    let overview_query = OverviewQuery {
        q: query.q,
        limit: query.limit,
        offset: query.offset,
    };
    let page = state.metrics.tokens_overview(&overview_query, query.force).await?;
    Ok(Json(page))
}

/// Execution-price history of a token.
#[utoipa::path(
    get,
    path = "/tokens/{category}/history",
    tag = "Tokens",
    params(("category" = String, Path, description = "Token category id"), HistoryQuery),
    responses(
        (status = 200, description = "Ascending price points", body = PriceHistory),
        (status = 400, description = "Invalid category or range", body = ErrorResponse),
        (status = 500, description = "Source failure", body = ErrorResponse)
    )
)]
pub async fn get_token_history(
    State(state): State<AppState>,
    Path(category): Path<String>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<PriceHistory>, ApiError> {
    let Query(query) = query?;
    let range = parse_range(query.range.as_deref())?;
    let history = state
        .metrics
        .token_price_history(&category, range, query.live.unwrap_or(true), query.force)
        .await?;
    Ok(Json(history))
}

/// Daily platform TVL and volume.
#[utoipa::path(
    get,
    path = "/stats/tvl-volume",
    tag = "Stats",
    params(RangeQuery),
    responses(
        (status = 200, description = "One point per day", body = TvlVolumeHistory),
        (status = 400, description = "Invalid range", body = ErrorResponse),
        (status = 500, description = "Source failure", body = ErrorResponse)
    )
)]
pub async fn get_tvl_volume(
    State(state): State<AppState>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<Json<TvlVolumeHistory>, ApiError> {
    let Query(query) = query?;
    let range = parse_range(query.range.as_deref())?;
    let history = state.metrics.tvl_volume_history(range, query.force).await?;
    Ok(Json(history))
}

/// Rolling 24h/30d volume and TVL.
#[utoipa::path(
    get,
    path = "/stats/volume",
    tag = "Stats",
    params(ForceQuery),
    responses(
        (status = 200, description = "Volume comparisons", body = VolumeStats),
        (status = 500, description = "Source failure", body = ErrorResponse)
    )
)]
pub async fn get_volume_stats(
    State(state): State<AppState>,
    query: Result<Query<ForceQuery>, QueryRejection>,
) -> Result<Json<VolumeStats>, ApiError> {
    let Query(query) = query?;
    let stats = state.metrics.stats_volume(query.force).await?;
    Ok(Json(stats))
}

/// Reconstructed balance history of an address.
#[utoipa::path(
    get,
    path = "/addresses/{address}/balance-history",
    tag = "Addresses",
    params(("address" = String, Path, description = "Cash address"), ForceQuery),
    responses(
        (status = 200, description = "Ascending balance points", body = BalanceHistory),
        (status = 400, description = "Invalid address", body = ErrorResponse),
        (status = 500, description = "Source failure", body = ErrorResponse)
    )
)]
pub async fn get_balance_history(
    State(state): State<AppState>,
    Path(address): Path<String>,
    query: Result<Query<ForceQuery>, QueryRejection>,
) -> Result<Json<BalanceHistory>, ApiError> {
    let Query(query) = query?;
    let history = state.metrics.balance_history(&address, query.force).await?;
    Ok(Json(history))
}

/// Records a transaction and invalidates cached aggregates.
#[utoipa::path(
    post,
    path = "/transactions",
    tag = "Transactions",
    request_body = RecordTransactionRequest,
    responses(
        (status = 201, description = "Entry recorded", body = StoredTransaction),
        (status = 400, description = "Malformed entry", body = ErrorResponse),
        (status = 500, description = "Log write failed", body = ErrorResponse)
    )
)]
pub async fn record_transaction(
    State(state): State<AppState>,
    request: Result<Json<RecordTransactionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StoredTransaction>), ApiError> {
    let Json(request) = request?;
    let entry = request.into_entry(state.clock.now());
    let recorded = state.gate.record(entry).await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

/// Server-sent events for every recorded transaction.
#[utoipa::path(
    get,
    path = "/events",
    tag = "Transactions",
    responses((status = 200, description = "text/event-stream of notifications"))
)]
pub async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("Event subscriber connected");
    let stream = BroadcastStream::new(state.events.subscribe()).filter_map(|message| {
        let notification = match message {
            Ok(notification) => notification,
            Err(e) => {
                warn!(error = %e, "Event subscriber lagged");
                return None;
            }
        };
        Event::default()
            .event(notification.channel.as_str())
            .json_data(&notification.payload)
            .map_err(|e| warn!(error = %e, "Failed to encode event"))
            .ok()
            .map(Ok)
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// OpenAPI document.
pub async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
