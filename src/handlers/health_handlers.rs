//! Health & readiness handlers.
//!
//! - GET /healthz  -> simple liveness ("ok")
//! - GET /readyz   -> readiness: at least one storage provider is registered

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

/// `GET /healthz`
///
/// Very small liveness probe — always returns 200 OK with a plain JSON body.
/// This endpoint should be cheap and never perform I/O.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /readyz`
///
/// HTTP 200 when the gateway can serve at least one provider, HTTP 503 when
/// none is configured. The body lists the registered providers.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let ready = !state.registry.is_empty();
    let providers = state.registry.names();

    let body = ReadyResponse {
        status: if ready { "ok".into() } else { "error".into() },
        providers,
        pending_oauth_states: state.oauth_states.len().await,
    };

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    providers: Vec<String>,
    pending_oauth_states: usize,
}
