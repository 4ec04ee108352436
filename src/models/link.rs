use serde::{Deserialize, Serialize};

use crate::expiry::{self, TimeRemaining};

/// A shortened link and its click history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Link {
    pub id: i64,
    pub short_code: String,
    pub original_url: String,
    /// Unix timestamp in milliseconds
    pub created_at: i64,
    /// Unix timestamp in milliseconds
    pub expires_at: i64,
    pub click_count: u64,
    pub clicks: Vec<Click>,
}

/// A single recorded activation of a link
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Click {
    pub id: i64,
    pub timestamp: i64,
    pub source: String,
    pub location: String,
}

/// Link fields known before storage assigns an id
#[derive(Debug, Clone)]
pub struct NewLink {
    pub short_code: String,
    pub original_url: String,
    pub created_at: i64,
    pub expires_at: i64,
}

/// Click fields known before storage assigns an id
#[derive(Debug, Clone)]
pub struct NewClick {
    pub timestamp: i64,
    pub source: String,
    pub location: String,
}

/// Request to create one link
#[derive(Debug, Clone, Default)]
pub struct CreateLinkRequest {
    pub url: String,
    pub custom_code: Option<String>,
    pub validity_minutes: Option<i64>,
}

impl CreateLinkRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_custom_code(mut self, code: impl Into<String>) -> Self {
        self.custom_code = Some(code.into());
        self
    }

    pub fn with_validity_minutes(mut self, minutes: i64) -> Self {
        self.validity_minutes = Some(minutes);
        self
    }
}

/// A link together with its status derived at response time
#[derive(Debug, Clone, Serialize)]
pub struct LinkView {
    #[serde(flatten)]
    pub link: Link,
    pub expired: bool,
    pub time_remaining: String,
}

impl LinkView {
    pub fn at(link: Link, now: i64) -> Self {
        let remaining = expiry::time_remaining(&link, now);
        Self {
            expired: matches!(remaining, TimeRemaining::Expired),
            time_remaining: remaining.to_string(),
            link,
        }
    }
}
