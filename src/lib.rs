pub mod config;
pub mod domain;
pub mod error;
mod handlers;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use domain::RouteTable;

// Application state
pub struct AppState {
    pub routes: RouteTable,
}

/// Build the dispatch service for a compiled route table.
pub fn create_router(routes: RouteTable) -> Router {
    let state = Arc::new(AppState { routes });

    Router::new()
        .route("/_routes", get(handlers::dispatch::list_routes))
        .route("/_expand/{service}", get(handlers::dispatch::expand_route))
        .fallback(handlers::dispatch::dispatch)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
