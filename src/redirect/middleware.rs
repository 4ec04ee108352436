use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;

/// When the redirect server first saw the request
#[derive(Copy, Clone)]
pub struct RequestStart(pub Instant);

/// Stamp the request with its arrival time and log how it was answered
pub async fn track_request(mut request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let path = request.uri().path().to_string();
    request.extensions_mut().insert(RequestStart(start));

    let response = next.run(request).await;

    tracing::debug!(
        %path,
        status = response.status().as_u16(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "redirect request served"
    );
    response
}
