use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{covers, handlers};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Cover search
        .route("/covers/best", get(covers::best_cover))
        .route("/covers/search", get(covers::search_covers))
        .route("/covers/grids", get(covers::steam_grids))
        .route("/covers/batch", post(covers::annotate_batch))
        .route("/covers/cache", delete(covers::clear_cache))
        .with_state(state);

    // The console is served separately; the API is CORS-open for it.
    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
