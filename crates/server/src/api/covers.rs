//! Cover search API handlers.
//!
//! Every handler runs under a per-request cancellation token. Callers who
//! need bounded latency pass `timeout_ms`; when the timer fires the token
//! cancels whatever is still in flight and the request resolves with 504.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use coverscout_core::sources::SourceError;
use coverscout_core::{AppEntry, CoverSearchResults};

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CoverQuery {
    pub name: String,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct GridQuery {
    pub steam_appid: u64,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct BestCoverResponse {
    pub name: String,
    /// Empty when no source had a cover.
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct GridsResponse {
    pub steam_appid: u64,
    pub grids: Vec<coverscout_core::sources::GridImage>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn map_source_error(e: SourceError) -> ApiError {
    match e {
        SourceError::Cancelled => error_response(
            StatusCode::GATEWAY_TIMEOUT,
            "Cover lookup timed out".to_string(),
        ),
        other => error_response(StatusCode::BAD_GATEWAY, other.to_string()),
    }
}

/// Token for one request; an optional timer cancels it.
fn request_token(timeout_ms: Option<u64>) -> CancellationToken {
    let token = CancellationToken::new();
    if let Some(ms) = timeout_ms {
        let timer = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            timer.cancel();
        });
    }
    token
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/covers/best?name=&timeout_ms=
///
/// Single best cover URL across the index and the storefront.
pub async fn best_cover(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CoverQuery>,
) -> Result<Json<BestCoverResponse>, impl IntoResponse> {
    let cancel = request_token(query.timeout_ms);

    match state.finder().find_best_cover(&query.name, &cancel).await {
        Ok(url) => Ok(Json(BestCoverResponse {
            name: query.name,
            url,
        })),
        Err(e) => Err(map_source_error(e)),
    }
}

/// GET /api/v1/covers/search?name=&timeout_ms=
///
/// Full per-source candidate lists.
pub async fn search_covers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CoverQuery>,
) -> Result<Json<CoverSearchResults>, impl IntoResponse> {
    let cancel = request_token(query.timeout_ms);

    match state.finder().find_all_covers(&query.name, &cancel).await {
        Ok(results) => Ok(Json(results)),
        Err(e) => Err(map_source_error(e)),
    }
}

/// GET /api/v1/covers/grids?steam_appid=&timeout_ms=
///
/// SteamGridDB grids for a Steam app. 503 when no API key is configured.
pub async fn steam_grids(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GridQuery>,
) -> Result<Json<GridsResponse>, impl IntoResponse> {
    let griddb = match state.griddb() {
        Some(g) => g,
        None => {
            return Err(error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                "SteamGridDB is not configured".to_string(),
            ))
        }
    };

    let cancel = request_token(query.timeout_ms);
    match griddb
        .grids_for_steam_app(query.steam_appid, &cancel)
        .await
    {
        Ok(grids) => Ok(Json(GridsResponse {
            steam_appid: query.steam_appid,
            grids,
        })),
        Err(e) => Err(map_source_error(e)),
    }
}

/// POST /api/v1/covers/batch
///
/// Annotate a list of apps with best-cover image paths. Apps whose lookup
/// fails come back unchanged; the batch itself always succeeds.
pub async fn annotate_batch(
    State(state): State<Arc<AppState>>,
    Json(apps): Json<Vec<AppEntry>>,
) -> Json<Vec<AppEntry>> {
    let cancel = CancellationToken::new();
    Json(state.finder().annotate_apps(apps, &cancel).await)
}

/// DELETE /api/v1/covers/cache
///
/// Drop all session caches across the sources.
pub async fn clear_cache(State(state): State<Arc<AppState>>) -> StatusCode {
    state.finder().clear_caches().await;
    if let Some(griddb) = state.griddb() {
        use coverscout_core::CoverSource;
        griddb.clear_cache().await;
    }
    StatusCode::NO_CONTENT
}
