//! Request validation between the JSON API and the registry
//!
//! The registry trusts the URL it is given, so syntax checks happen here.
//! Malformed fields become per-item validation errors rather than a
//! rejected request body.

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::models::CreateLinkRequest;
use crate::registry::ValidationError;

/// One item of a creation request as it arrives over the wire
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateLinkPayload {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub custom_code: Option<String>,
    #[serde(default)]
    pub validity_minutes: Option<Value>,
}

/// Creation body: a list of links, or a single link
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CreateLinksBody {
    Batch(Vec<CreateLinkPayload>),
    Single(CreateLinkPayload),
}

impl CreateLinksBody {
    pub fn into_items(self) -> Vec<CreateLinkPayload> {
        match self {
            CreateLinksBody::Batch(items) => items,
            CreateLinksBody::Single(item) => vec![item],
        }
    }
}

/// Accepts absolute `http`/`https` URLs with a host
pub fn validate_url(raw: &str) -> Result<(), ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::InvalidUrl);
    }

    let parsed = Url::parse(raw).map_err(|_| ValidationError::InvalidUrl)?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(()),
        _ => Err(ValidationError::InvalidUrl),
    }
}

/// Whole numbers pass through for the registry to range-check; anything else is invalid
pub fn parse_validity_minutes(value: Option<&Value>) -> Result<Option<i64>, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or(ValidationError::InvalidValidityWindow),
        Some(_) => Err(ValidationError::InvalidValidityWindow),
    }
}

impl TryFrom<CreateLinkPayload> for CreateLinkRequest {
    type Error = ValidationError;

    fn try_from(payload: CreateLinkPayload) -> Result<Self, Self::Error> {
        validate_url(&payload.url)?;
        let validity_minutes = parse_validity_minutes(payload.validity_minutes.as_ref())?;

        // A blank custom code field means "generate one"; anything else is
        // passed on untouched for the code generator to accept or reject
        let custom_code = payload
            .custom_code
            .filter(|code| !code.trim().is_empty());

        Ok(CreateLinkRequest {
            url: payload.url.trim().to_string(),
            custom_code,
            validity_minutes,
        })
    }
}
