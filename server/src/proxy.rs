//! Keyed pass-through to the upstream deployment of this API. The public
//! instance exposes only these routes, so the shared secret never reaches
//! the browser.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{Method, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};

use crate::{error::AppError, state::AppState};

/// Forward the request to `API_BASE_URL/<path>`, query string preserved,
/// `x-api-key` injected. The upstream status and body are relayed
/// verbatim, success or failure; only an unreachable upstream becomes a
/// local error.
pub async fn proxy_handler(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    method: Method,
    body: Bytes,
) -> Result<Response, AppError> {
    let base = state.config.api_base_url.trim_end_matches('/');
    let mut url = format!("{base}/{path}");

    if let Some(query) = query {
        url.push('?');
        url.push_str(&query);
    }

    let request = match method {
        Method::GET => state.http_client.get(&url),
        Method::POST => state
            .http_client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body),
        _ => return Err(AppError::MethodNotAllowed),
    };

    let upstream = request
        .header("x-api-key", state.config.api_key.as_str())
        .send()
        .await
        .map_err(AppError::Upstream)?;

    let status = upstream.status();
    let content_type = upstream
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/json")
        .to_string();
    let payload = upstream.bytes().await.map_err(AppError::Upstream)?;

    Ok((status, [(CONTENT_TYPE, content_type)], payload).into_response())
}
