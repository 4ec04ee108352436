//! Short-link registry
//!
//! Owns link creation (code generation, collision retries, expiry
//! computation), click recording, and read access for listings and
//! statistics. One `Registry` is built at startup and shared by the
//! HTTP routers through `Arc`.

pub mod code;
pub mod error;

pub use error::{RegistryError, RegistryResult, ValidationError};

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::RegistryConfig;
use crate::models::{Click, CreateLinkRequest, Link, LinkView, NewClick, NewLink};
use crate::stats::RegistryStats;
use crate::storage::{MemoryStorage, Storage, StorageError};
use crate::telemetry::{NoopTelemetry, Origin, Severity, Telemetry};

const MILLIS_PER_MINUTE: i64 = 60_000;

pub struct Registry {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    telemetry: Arc<dyn Telemetry>,
    config: RegistryConfig,
    generate_code: fn() -> String,
}

impl Registry {
    pub fn new(
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
        telemetry: Arc<dyn Telemetry>,
        config: RegistryConfig,
    ) -> Self {
        Self {
            storage,
            clock,
            telemetry,
            config,
            generate_code: code::random_code,
        }
    }

    /// Empty in-memory registry on the wall clock with telemetry disabled
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(SystemClock),
            Arc::new(NoopTelemetry),
            RegistryConfig::default(),
        )
    }

    /// Replace the random code source
    pub fn with_code_generator(mut self, generate_code: fn() -> String) -> Self {
        self.generate_code = generate_code;
        self
    }

    pub fn now(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Create one link. The URL is expected to be validated by the caller.
    pub async fn create(&self, request: CreateLinkRequest) -> Result<Link, ValidationError> {
        let result = self.try_create(&request).await;

        match &result {
            Ok(link) => {
                info!(short_code = %link.short_code, expires_at = link.expires_at, "created short link");
                self.telemetry.emit(
                    Origin::Backend,
                    Severity::Info,
                    "service",
                    &format!("created short link {}", link.short_code),
                );
            }
            Err(err) => {
                warn!(url = %request.url, error = %err, "rejected link creation");
                self.telemetry.emit(
                    Origin::Backend,
                    Severity::Warn,
                    "service",
                    &format!("rejected link creation: {err}"),
                );
            }
        }

        result
    }

    /// Create each request independently, in order.
    ///
    /// A failure does not undo links created earlier in the batch; the result
    /// holds one outcome per request at the same index.
    pub async fn create_batch(
        &self,
        requests: Vec<CreateLinkRequest>,
    ) -> Vec<Result<Link, ValidationError>> {
        let mut outcomes = Vec::with_capacity(requests.len());
        for request in requests {
            outcomes.push(self.create(request).await);
        }
        outcomes
    }

    async fn try_create(&self, request: &CreateLinkRequest) -> Result<Link, ValidationError> {
        let minutes = match request.validity_minutes {
            None => self.config.default_validity_minutes,
            Some(minutes) if minutes > 0 => minutes,
            Some(_) => return Err(ValidationError::InvalidValidityWindow),
        };

        let created_at = self.now();
        let expires_at = minutes
            .checked_mul(MILLIS_PER_MINUTE)
            .and_then(|window| created_at.checked_add(window))
            .ok_or(ValidationError::InvalidValidityWindow)?;

        let new_link = |short_code: String| NewLink {
            short_code,
            original_url: request.url.clone(),
            created_at,
            expires_at,
        };

        if let Some(custom) = request.custom_code.as_deref() {
            let short_code = code::generate(Some(custom))?;
            // A chosen code is never retried
            return match self.storage.insert(new_link(short_code)).await {
                Ok(link) => Ok(link),
                Err(StorageError::Conflict) => Err(ValidationError::CodeCollision),
                Err(err) => {
                    warn!(short_code = custom, error = %err, "storage refused insert");
                    Err(ValidationError::CodeCollision)
                }
            };
        }

        for attempt in 1..=self.config.max_code_attempts {
            let short_code = (self.generate_code)();
            match self.storage.insert(new_link(short_code.clone())).await {
                Ok(link) => return Ok(link),
                Err(StorageError::Conflict) => {
                    debug!(%short_code, attempt, "generated short code collided, retrying");
                }
                Err(err) => {
                    warn!(%short_code, error = %err, "storage refused insert");
                    return Err(ValidationError::CodeCollision);
                }
            }
        }

        Err(ValidationError::CodeCollision)
    }

    pub async fn get(&self, short_code: &str) -> RegistryResult<Link> {
        self.storage
            .get(short_code)
            .await
            .ok_or_else(|| RegistryError::NotFound(short_code.to_string()))
    }

    /// Snapshot of every link, newest first; equal timestamps put the later insert first
    pub async fn list_all(&self) -> Vec<Link> {
        let mut links = self.storage.snapshot().await;
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        links
    }

    /// Record one activation of a link.
    ///
    /// Unknown codes leave the registry untouched and report `NotFound`,
    /// which callers treat as non-fatal.
    pub async fn record_click(
        &self,
        short_code: &str,
        source: &str,
        location: &str,
    ) -> RegistryResult<Click> {
        let click = NewClick {
            timestamp: self.now(),
            source: source.to_string(),
            location: location.to_string(),
        };

        match self.storage.append_click(short_code, click).await {
            Ok(click) => {
                debug!(%short_code, click_id = click.id, "recorded click");
                Ok(click)
            }
            Err(_) => {
                warn!(%short_code, "click recorded against unknown short code");
                self.telemetry.emit(
                    Origin::Backend,
                    Severity::Warn,
                    "repository",
                    &format!("click on unknown short code {short_code}"),
                );
                Err(RegistryError::NotFound(short_code.to_string()))
            }
        }
    }

    pub async fn stats(&self) -> RegistryStats {
        let links = self.storage.snapshot().await;
        RegistryStats::compute(&links, self.now())
    }

    /// Attach the derived expiry status as of now
    pub fn view(&self, link: Link) -> LinkView {
        LinkView::at(link, self.now())
    }

    pub async fn len(&self) -> usize {
        self.storage.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
