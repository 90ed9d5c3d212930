/// Media serving endpoint for the disk backend
use crate::{context::AppContext, error::{AppError, AppResult}};
use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

/// Build media routes
pub fn routes() -> Router<AppContext> {
    Router::new().route("/media/*key", get(get_media))
}

/// Serve a stored media object.
///
/// Keys are content-addressed, so the payload never changes under a key
/// and responses are marked immutable.
async fn get_media(
    State(ctx): State<AppContext>,
    Path(key): Path<String>,
) -> AppResult<Response> {
    let (data, content_type) = ctx
        .media
        .fetch(&key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Media not found: {}", key)))?;

    let response = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, data.len().to_string())
        .header(header::CACHE_CONTROL, "public, max-age=31536000, immutable")
        .body(axum::body::Body::from(data))
        .map_err(|e| AppError::Internal(format!("Failed to build media response: {}", e)))?;

    Ok(response.into_response())
}
