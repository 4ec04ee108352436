use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::config::Config;
use crate::registry::Registry;
use crate::telemetry::Telemetry;

use super::handlers::{
    create_links, get_link, get_stats, health_check, list_clicks, list_links, record_click,
    relay_log, AppState,
};

pub fn create_api_router(
    registry: Arc<Registry>,
    telemetry: Arc<dyn Telemetry>,
    config: Arc<Config>,
) -> Router {
    let state = Arc::new(AppState {
        registry,
        telemetry,
        max_batch_size: config.max_batch_size,
    });

    let api_routes = Router::new()
        .route("/links", post(create_links).get(list_links))
        .route("/links/{code}", get(get_link))
        .route("/links/{code}/clicks", get(list_clicks).post(record_click))
        .route("/stats", get(get_stats))
        .route("/logs", post(relay_log))
        .with_state(state);

    let mut router = Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes);

    if let Some(ref static_dir) = config.frontend.static_dir {
        router = router.fallback_service(ServeDir::new(static_dir));
    }

    if config.cors_allow_any {
        router = router.layer(CorsLayer::permissive());
    }

    router
}
