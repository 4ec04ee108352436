use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::validation::CreateLinksBody;
use crate::models::{Click, CreateLinkRequest, LinkView};
use crate::redirect::handlers::click_context;
use crate::registry::{Registry, RegistryError, ValidationError};
use crate::stats::RegistryStats;
use crate::telemetry::{Origin, Severity, Telemetry, TelemetryEvent};

pub struct AppState {
    pub registry: Arc<Registry>,
    pub telemetry: Arc<dyn Telemetry>,
    pub max_batch_size: usize,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            kind: None,
        }
    }
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn not_found(err: RegistryError) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: err.to_string(),
            kind: Some("not_found"),
        }),
    )
}

#[derive(Serialize)]
pub struct ValidationErrorBody {
    pub kind: &'static str,
    pub message: String,
}

impl From<ValidationError> for ValidationErrorBody {
    fn from(err: ValidationError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Result of one item in a creation batch
#[derive(Serialize)]
pub struct CreateOutcome {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<LinkView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ValidationErrorBody>,
}

/// Create one or more shortened links
///
/// Items are processed independently. Responds 201 when every item
/// succeeded and 207 when at least one failed.
pub async fn create_links(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateLinksBody>,
) -> Result<(StatusCode, Json<Vec<CreateOutcome>>), ApiError> {
    let items = body.into_items();

    if items.is_empty() || items.len() > state.max_batch_size {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(format!(
                "A request must contain between 1 and {} links",
                state.max_batch_size
            ))),
        ));
    }

    let mut outcomes = Vec::with_capacity(items.len());
    for item in items {
        let result = match CreateLinkRequest::try_from(item) {
            Ok(request) => state.registry.create(request).await,
            Err(err) => Err(err),
        };

        outcomes.push(match result {
            Ok(link) => CreateOutcome {
                ok: true,
                link: Some(state.registry.view(link)),
                error: None,
            },
            Err(err) => CreateOutcome {
                ok: false,
                link: None,
                error: Some(err.into()),
            },
        });
    }

    let status = if outcomes.iter().all(|outcome| outcome.ok) {
        StatusCode::CREATED
    } else {
        StatusCode::MULTI_STATUS
    };

    Ok((status, Json(outcomes)))
}

/// List all shortened links, newest first
pub async fn list_links(State(state): State<Arc<AppState>>) -> Json<Vec<LinkView>> {
    let now = state.registry.now();
    let links = state
        .registry
        .list_all()
        .await
        .into_iter()
        .map(|link| LinkView::at(link, now))
        .collect();
    Json(links)
}

/// Get a shortened link by code
pub async fn get_link(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<LinkView>, ApiError> {
    let link = state.registry.get(&code).await.map_err(not_found)?;
    Ok(Json(state.registry.view(link)))
}

/// Click history of a link in the order recorded
pub async fn list_clicks(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<Vec<Click>>, ApiError> {
    let link = state.registry.get(&code).await.map_err(not_found)?;
    Ok(Json(link.clicks))
}

#[derive(Debug, Default, Deserialize)]
pub struct RecordClickRequest {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Record a click reported by the UI
///
/// The JSON body is optional; missing fields fall back to the request
/// headers. Unknown codes get a 404 body the caller may ignore.
pub async fn record_click(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    headers: HeaderMap,
    payload: Option<Json<RecordClickRequest>>,
) -> Result<(StatusCode, Json<Click>), ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let (default_source, default_location) = click_context(&headers);
    let source = payload.source.unwrap_or(default_source);
    let location = payload.location.unwrap_or(default_location);

    let click = state
        .registry
        .record_click(&code, &source, &location)
        .await
        .map_err(not_found)?;

    Ok((StatusCode::ACCEPTED, Json(click)))
}

/// Aggregate counts at the current time
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<RegistryStats> {
    Json(state.registry.stats().await)
}

#[derive(Debug, Deserialize)]
pub struct LogRequest {
    pub origin: Origin,
    pub severity: Severity,
    pub category: String,
    pub message: String,
}

/// Relay an event from the browser UI to the telemetry collector
pub async fn relay_log(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LogRequest>,
) -> Result<(StatusCode, Json<SuccessResponse>), ApiError> {
    let event = TelemetryEvent::new(
        payload.origin,
        payload.severity,
        &payload.category,
        &payload.message,
    )
    .map_err(|err| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: err.to_string(),
                kind: Some("invalid_category"),
            }),
        )
    })?;

    state
        .telemetry
        .emit(event.origin, event.severity, &event.category, &event.message);

    Ok((
        StatusCode::ACCEPTED,
        Json(SuccessResponse {
            message: "accepted".to_string(),
        }),
    ))
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse> {
    Json(SuccessResponse {
        message: "OK".to_string(),
    })
}
