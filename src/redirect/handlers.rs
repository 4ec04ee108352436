use axum::{
    extract::{Path, State},
    http::{
        header::{HeaderMap, HeaderName, HeaderValue, REFERER, USER_AGENT},
        StatusCode,
    },
    response::{IntoResponse, Redirect},
    Extension, Json,
};
use serde::Serialize;
use std::sync::Arc;

use super::middleware::RequestStart;
use crate::expiry::is_expired;
use crate::registry::Registry;

pub struct RedirectState {
    pub registry: Arc<Registry>,
}

/// Source and location for a click, taken from the Referer and User-Agent headers
pub fn click_context(headers: &HeaderMap) -> (String, String) {
    let header = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let source = header(REFERER).unwrap_or_else(|| "direct".to_string());
    let location = header(USER_AGENT).unwrap_or_else(|| "unknown".to_string());
    (source, location)
}

/// Redirect to original URL
pub async fn redirect_url(
    State(state): State<Arc<RedirectState>>,
    Path(code): Path<String>,
    Extension(RequestStart(request_start)): Extension<RequestStart>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let link = match state.registry.get(&code).await {
        Ok(link) => link,
        Err(_) => return (StatusCode::NOT_FOUND, "Link not found").into_response(),
    };

    if is_expired(&link, state.registry.now()) {
        return (StatusCode::GONE, "This link has expired").into_response();
    }

    let (source, location) = click_context(&headers);
    if let Err(err) = state.registry.record_click(&code, &source, &location).await {
        tracing::warn!(short_code = %code, error = %err, "failed to record click");
    }

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        "x-tinylink-timing-ms",
        HeaderValue::from(request_start.elapsed().as_millis() as u64),
    );

    (response_headers, Redirect::temporary(&link.original_url)).into_response()
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    #[derive(Serialize)]
    struct HealthResponse {
        status: String,
    }

    Json(HealthResponse {
        status: "OK".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_context_defaults() {
        let headers = HeaderMap::new();
        assert_eq!(
            click_context(&headers),
            ("direct".to_string(), "unknown".to_string())
        );
    }

    #[test]
    fn test_click_context_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(REFERER, HeaderValue::from_static("https://news.example/item"));
        headers.insert(USER_AGENT, HeaderValue::from_static("curl/8.0"));

        assert_eq!(
            click_context(&headers),
            (
                "https://news.example/item".to_string(),
                "curl/8.0".to_string()
            )
        );
    }
}
