//! Defines routes for the storage gateway.
//!
//! ## Structure
//! - **Auth endpoints** (no session required)
//!   - `GET      /auth/{provider}/url` — OAuth2 authorization URL
//!   - `GET|POST /auth/validate`       — redeem `code` for `state`
//!
//! - **File endpoints** (require the `token` cookie)
//!   - `PUT    /files/{*filepath}`   — upload (raw body)
//!   - `GET    /files/{*filepath}`   — read (streamed)
//!   - `DELETE /files/{*filepath}`   — delete
//!   - `GET    /browse[/{*filepath}]` — list a directory
//!   - `POST   /publish/{*filepath}` — make public, return link
//!
//! The wildcard `*filepath` allows nested paths like `photos/2025/img.jpg`.

use crate::{
    handlers::{
        auth_handlers::{auth_url, validate},
        file_handlers::{
            browse, browse_root, delete_file, publish_file, read_file, upload_file,
        },
        health_handlers::{healthz, readyz},
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Build and return the router for all gateway routes.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // OAuth2
        .route("/auth/{provider}/url", get(auth_url))
        .route("/auth/validate", get(validate).post(validate))
        // Files
        .route(
            "/files/{*filepath}",
            put(upload_file).get(read_file).delete(delete_file),
        )
        .route("/browse", get(browse_root))
        .route("/browse/{*filepath}", get(browse))
        .route("/publish/{*filepath}", post(publish_file))
}
