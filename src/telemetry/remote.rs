//! HTTP telemetry sender
//!
//! `emit` validates the event and hands it to a background task over a
//! bounded channel. The task posts events one at a time to the collector.
//! A full queue drops the event; a failed post is logged and forgotten.

use reqwest::Client;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{Origin, Severity, Telemetry, TelemetryError, TelemetryEvent};
use crate::config::TelemetryConfig;

/// Background task that owns the HTTP client and drains the queue
struct TelemetrySender {
    receiver: mpsc::Receiver<TelemetryEvent>,
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl TelemetrySender {
    async fn run(mut self) {
        while let Some(event) = self.receiver.recv().await {
            if let Err(err) = self.send(&event).await {
                warn!(
                    endpoint = %self.endpoint,
                    category = %event.category,
                    error = %err,
                    "dropping telemetry event"
                );
            }
        }
        debug!("telemetry queue closed, sender exiting");
    }

    async fn send(&self, event: &TelemetryEvent) -> Result<(), TelemetryError> {
        let mut request = self.client.post(&self.endpoint).json(event);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        request
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map(|_| ())
            .map_err(|e| TelemetryError::Transport(e.to_string()))
    }
}

/// Telemetry that ships events to a remote collector
pub struct RemoteTelemetry {
    sender: mpsc::Sender<TelemetryEvent>,
}

impl RemoteTelemetry {
    /// Spawn the sender task. Must be called inside a tokio runtime.
    pub fn new(endpoint: &str, config: &TelemetryConfig) -> Result<Self, TelemetryError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| TelemetryError::Transport(e.to_string()))?;

        let (sender, receiver) = mpsc::channel(config.queue_size.max(1));

        let task = TelemetrySender {
            receiver,
            client,
            endpoint: endpoint.to_string(),
            token: config.token.clone(),
        };

        tokio::spawn(async move {
            task.run().await;
        });

        Ok(Self { sender })
    }
}

impl Telemetry for RemoteTelemetry {
    fn emit(&self, origin: Origin, severity: Severity, category: &str, message: &str) {
        let event = match TelemetryEvent::new(origin, severity, category, message) {
            Ok(event) => event,
            Err(err) => {
                warn!(error = %err, "telemetry event rejected locally");
                return;
            }
        };

        if self.sender.try_send(event).is_err() {
            warn!("telemetry queue full, dropping event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::HeaderMap, routing::post, Json, Router};
    use std::sync::{Arc, Mutex};

    type Received = Arc<Mutex<Vec<(TelemetryEvent, Option<String>)>>>;

    async fn collect(
        State(received): State<Received>,
        headers: HeaderMap,
        Json(event): Json<TelemetryEvent>,
    ) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        received.lock().unwrap().push((event, auth));
    }

    async fn start_collector() -> (String, Received) {
        let received: Received = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/logs", post(collect))
            .with_state(Arc::clone(&received));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/logs", addr), received)
    }

    async fn wait_for(received: &Received, count: usize) {
        for _ in 0..100 {
            if received.lock().unwrap().len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("collector did not receive {count} events in time");
    }

    #[tokio::test]
    async fn test_events_are_posted_with_token() {
        let (endpoint, received) = start_collector().await;
        let config = TelemetryConfig {
            token: Some("secret".to_string()),
            ..TelemetryConfig::default()
        };
        let telemetry = RemoteTelemetry::new(&endpoint, &config).unwrap();

        telemetry.emit(Origin::Backend, Severity::Error, "handler", "boom");
        wait_for(&received, 1).await;

        let events = received.lock().unwrap();
        assert_eq!(events[0].0.severity, Severity::Error);
        assert_eq!(events[0].0.category, "handler");
        assert_eq!(events[0].0.message, "boom");
        assert_eq!(events[0].1.as_deref(), Some("Bearer secret"));
    }

    #[tokio::test]
    async fn test_invalid_category_is_never_sent() {
        let (endpoint, received) = start_collector().await;
        let telemetry = RemoteTelemetry::new(&endpoint, &TelemetryConfig::default()).unwrap();

        telemetry.emit(Origin::Frontend, Severity::Info, "db", "not allowed");
        telemetry.emit(Origin::Frontend, Severity::Info, "page", "allowed");
        wait_for(&received, 1).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        let events = received.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0.category, "page");
        assert!(events[0].1.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_swallowed() {
        let config = TelemetryConfig {
            timeout_ms: 200,
            ..TelemetryConfig::default()
        };
        // Port 9 (discard) is expected to refuse connections on localhost
        let telemetry = RemoteTelemetry::new("http://127.0.0.1:9/logs", &config).unwrap();

        let start = std::time::Instant::now();
        for _ in 0..10 {
            telemetry.emit(Origin::Backend, Severity::Warn, "service", "nobody listens");
        }
        assert!(start.elapsed() < Duration::from_secs(1));

        // Failed deliveries must not take the sender down with them
        tokio::time::sleep(Duration::from_millis(300)).await;
        let start = std::time::Instant::now();
        telemetry.emit(Origin::Backend, Severity::Info, "service", "still accepted");
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_full_queue_drops_without_blocking() {
        let config = TelemetryConfig {
            queue_size: 1,
            timeout_ms: 200,
            ..TelemetryConfig::default()
        };
        let telemetry = RemoteTelemetry::new("http://127.0.0.1:9/logs", &config).unwrap();

        let start = std::time::Instant::now();
        for _ in 0..1000 {
            telemetry.emit(Origin::Backend, Severity::Debug, "utils", "flood");
        }
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
