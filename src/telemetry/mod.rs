//! Fire-and-forget structured event reporting
//!
//! Events carry an origin, a severity, a category from a fixed per-origin
//! allow-list and a free-form message. Emitting never fails and never waits
//! on the network: invalid events are dropped locally and transport errors
//! are logged and swallowed by the sender.

pub mod remote;

pub use remote::RemoteTelemetry;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Frontend,
    Backend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

const BACKEND_CATEGORIES: &[&str] = &[
    "cache",
    "controller",
    "cron_job",
    "db",
    "domain",
    "handler",
    "repository",
    "route",
    "service",
];

const FRONTEND_CATEGORIES: &[&str] = &["api", "component", "hook", "page", "state", "style"];

const SHARED_CATEGORIES: &[&str] = &["auth", "config", "middleware", "utils"];

impl Origin {
    /// Categories this origin may report under
    pub fn allows(&self, category: &str) -> bool {
        let own = match self {
            Origin::Backend => BACKEND_CATEGORIES,
            Origin::Frontend => FRONTEND_CATEGORIES,
        };
        own.contains(&category) || SHARED_CATEGORIES.contains(&category)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Frontend => write!(f, "frontend"),
            Origin::Backend => write!(f, "backend"),
        }
    }
}

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("category '{category}' is not allowed for {origin} events")]
    UnknownCategory { origin: Origin, category: String },
    #[error("telemetry transport failed: {0}")]
    Transport(String),
}

/// A validated event, ready to transmit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    pub origin: Origin,
    pub severity: Severity,
    pub category: String,
    pub message: String,
}

impl TelemetryEvent {
    pub fn new(
        origin: Origin,
        severity: Severity,
        category: &str,
        message: &str,
    ) -> Result<Self, TelemetryError> {
        if !origin.allows(category) {
            return Err(TelemetryError::UnknownCategory {
                origin,
                category: category.to_string(),
            });
        }

        Ok(Self {
            origin,
            severity,
            category: category.to_string(),
            message: message.to_string(),
        })
    }
}

/// Capability for reporting events; implementations must not block or fail
pub trait Telemetry: Send + Sync {
    fn emit(&self, origin: Origin, severity: Severity, category: &str, message: &str);
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

impl Telemetry for NoopTelemetry {
    fn emit(&self, _origin: Origin, _severity: Severity, _category: &str, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_allow_lists() {
        assert!(Origin::Backend.allows("service"));
        assert!(Origin::Backend.allows("cron_job"));
        assert!(Origin::Frontend.allows("component"));
        assert!(Origin::Frontend.allows("auth"));
        assert!(Origin::Backend.allows("middleware"));

        assert!(!Origin::Frontend.allows("db"));
        assert!(!Origin::Backend.allows("style"));
        assert!(!Origin::Backend.allows("Service"));
        assert!(!Origin::Backend.allows(""));
    }

    #[test]
    fn test_event_rejects_foreign_category() {
        let err = TelemetryEvent::new(Origin::Frontend, Severity::Info, "repository", "hi")
            .unwrap_err();
        assert!(matches!(err, TelemetryError::UnknownCategory { .. }));
        assert_eq!(
            err.to_string(),
            "category 'repository' is not allowed for frontend events"
        );
    }

    #[test]
    fn test_event_wire_format() {
        let event =
            TelemetryEvent::new(Origin::Backend, Severity::Fatal, "db", "connection lost").unwrap();
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "origin": "backend",
                "severity": "fatal",
                "category": "db",
                "message": "connection lost",
            })
        );
    }
}
