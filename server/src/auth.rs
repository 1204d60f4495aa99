use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, state::AppState};

/// Shared-secret gate for the internal routes. Disabled when no key is
/// configured so local development works without secrets.
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if state.config.api_key.is_empty() {
        return Ok(next.run(request).await);
    }

    match normalized_api_key(request.headers()) {
        Some(key) if key == state.config.api_key => Ok(next.run(request).await),
        _ => Err(AppError::InvalidApiKey),
    }
}

pub fn normalized_api_key(headers: &HeaderMap) -> Option<String> {
    let key = headers.get("x-api-key")?.to_str().ok()?.trim();

    if key.is_empty() || key.len() > 256 {
        return None;
    }

    Some(key.to_string())
}
