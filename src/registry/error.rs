use thiserror::Error;

/// Reasons a creation request is refused
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("URL must be a non-empty absolute http(s) URL")]
    InvalidUrl,
    #[error("custom code must be 3-20 alphanumeric characters")]
    InvalidCustomCode,
    #[error("validity window must be a positive whole number of minutes")]
    InvalidValidityWindow,
    #[error("short code is already in use")]
    CodeCollision,
}

impl ValidationError {
    /// Stable machine-readable name used in API responses
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::InvalidUrl => "invalid_url",
            ValidationError::InvalidCustomCode => "invalid_custom_code",
            ValidationError::InvalidValidityWindow => "invalid_validity_window",
            ValidationError::CodeCollision => "code_collision",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("short code '{0}' not found")]
    NotFound(String),
}

pub type RegistryResult<T> = Result<T, RegistryError>;
