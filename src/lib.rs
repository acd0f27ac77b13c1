//! HTTP gateway exposing cloud storage providers (browse, upload, read,
//! delete, publish) behind OAuth2 session cookies.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// The complete application router with request tracing attached.
pub fn app(state: AppState) -> Router {
    routes::routes::routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
