use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tinylink::api;
use tinylink::clock::SystemClock;
use tinylink::config::Config;
use tinylink::redirect;
use tinylink::registry::Registry;
use tinylink::storage::MemoryStorage;
use tinylink::telemetry::{NoopTelemetry, Origin, RemoteTelemetry, Severity, Telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env()?);
    info!("Loaded configuration");

    // Initialize telemetry
    let telemetry: Arc<dyn Telemetry> = match config.telemetry.endpoint {
        Some(ref endpoint) => {
            info!("📡 Remote telemetry enabled: {}", endpoint);
            Arc::new(RemoteTelemetry::new(endpoint, &config.telemetry)?)
        }
        None => {
            info!("📡 Remote telemetry disabled (TELEMETRY_ENDPOINT not set)");
            Arc::new(NoopTelemetry)
        }
    };

    // Initialize registry
    let registry = Arc::new(Registry::new(
        Arc::new(MemoryStorage::new()),
        Arc::new(SystemClock),
        Arc::clone(&telemetry),
        config.registry.clone(),
    ));
    info!(
        "Registry ready (default validity {} min, up to {} code attempts)",
        config.registry.default_validity_minutes, config.registry.max_code_attempts
    );

    // Create routers
    let api_router = api::create_api_router(
        Arc::clone(&registry),
        Arc::clone(&telemetry),
        Arc::clone(&config),
    );
    let redirect_router = redirect::create_redirect_router(Arc::clone(&registry));

    // Log frontend configuration
    if let Some(ref static_dir) = config.frontend.static_dir {
        info!("🎨 Serving frontend from directory: {}", static_dir);
    }

    // Start API server
    let api_addr = format!("{}:{}", config.api_server.host, config.api_server.port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("🚀 API server listening on http://{}", api_addr);
    info!("   - API endpoints available at http://{}/api/...", api_addr);

    // Start redirect server
    let redirect_addr = format!(
        "{}:{}",
        config.redirect_server.host, config.redirect_server.port
    );
    let redirect_listener = tokio::net::TcpListener::bind(&redirect_addr).await?;
    info!("🚀 Redirect server listening on http://{}", redirect_addr);

    telemetry.emit(
        Origin::Backend,
        Severity::Info,
        "config",
        &format!("service started (api {api_addr}, redirect {redirect_addr})"),
    );

    // Run both servers concurrently
    tokio::try_join!(
        axum::serve(api_listener, api_router),
        axum::serve(redirect_listener, redirect_router),
    )?;

    Ok(())
}
