//! HTTP handlers for file operations.
//! Bodies are streamed in both directions; all storage work is delegated to
//! the session's `StorageProvider`.

use crate::{
    errors::AppError,
    handlers::session::Session,
    models::responses::{BrowseResponse, PublishResponse},
    state::AppState,
};
use axum::{
    Json,
    body::Body,
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::Response,
};
use futures::StreamExt;
use std::io;

/// PUT `/files/{*filepath}` — upload the request body to `filepath`.
pub async fn upload_file(
    State(state): State<AppState>,
    session: Session,
    Path(filepath): Path<String>,
    body: Body,
) -> Result<StatusCode, AppError> {
    let provider = state.provider_for(&session)?;
    let stream = body.into_data_stream().map(|chunk| chunk.map_err(io::Error::other));

    provider
        .add(&session.token, &filepath, Box::pin(stream))
        .await?;

    tracing::debug!("uploaded {} via {}", filepath, provider.name());
    Ok(StatusCode::OK)
}

/// GET `/browse` — list the root directory.
pub async fn browse_root(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<BrowseResponse>, AppError> {
    browse_path(&state, &session, "").await
}

/// GET `/browse/{*filepath}` — list a directory.
pub async fn browse(
    State(state): State<AppState>,
    session: Session,
    Path(filepath): Path<String>,
) -> Result<Json<BrowseResponse>, AppError> {
    browse_path(&state, &session, &filepath).await
}

async fn browse_path(
    state: &AppState,
    session: &Session,
    filepath: &str,
) -> Result<Json<BrowseResponse>, AppError> {
    let provider = state.provider_for(session)?;
    let file_list = provider.browse(&session.token, filepath).await?;
    Ok(Json(BrowseResponse { file_list }))
}

/// DELETE `/files/{*filepath}`
pub async fn delete_file(
    State(state): State<AppState>,
    session: Session,
    Path(filepath): Path<String>,
) -> Result<StatusCode, AppError> {
    let provider = state.provider_for(&session)?;
    provider.delete(&session.token, &filepath).await?;

    tracing::debug!("deleted {} via {}", filepath, provider.name());
    Ok(StatusCode::OK)
}

/// POST `/publish/{*filepath}` — make a file public and return its link.
pub async fn publish_file(
    State(state): State<AppState>,
    session: Session,
    Path(filepath): Path<String>,
) -> Result<Json<PublishResponse>, AppError> {
    let provider = state.provider_for(&session)?;
    let url = provider.publish(&session.token, &filepath).await?;
    Ok(Json(PublishResponse { url }))
}

/// GET `/files/{*filepath}` — stream a file's content.
///
/// A provider with nothing to stream yields an empty 200. The provider stream
/// is owned by the response body and dropped once sent or abandoned.
pub async fn read_file(
    State(state): State<AppState>,
    session: Session,
    Path(filepath): Path<String>,
) -> Result<Response, AppError> {
    let provider = state.provider_for(&session)?;
    let Some(stream) = provider.read(&session.token, &filepath).await? else {
        return Ok(Response::new(Body::empty()));
    };

    let mut response = Response::new(Body::from_stream(stream));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    Ok(response)
}
