use axum::{middleware, routing::get, Router};
use std::sync::Arc;

use crate::registry::Registry;

use super::handlers::{health_check, redirect_url, RedirectState};
use super::middleware::track_request;

pub fn create_redirect_router(registry: Arc<Registry>) -> Router {
    let state = Arc::new(RedirectState { registry });

    Router::new()
        .route("/", get(health_check))
        .route("/{code}", get(redirect_url))
        .layer(middleware::from_fn(track_request))
        .with_state(state)
}
