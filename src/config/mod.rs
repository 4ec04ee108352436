use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_server: ServerConfig,
    pub redirect_server: ServerConfig,
    pub registry: RegistryConfig,
    pub telemetry: TelemetryConfig,
    pub frontend: FrontendConfig,
    /// Most links accepted in one creation request
    pub max_batch_size: usize,
    /// Allow cross-origin requests from any origin (browser UI on another host)
    pub cors_allow_any: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Validity window applied when a request does not specify one
    pub default_validity_minutes: i64,
    /// Ceiling on random code generation attempts per link
    pub max_code_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Remote log collector; telemetry is disabled when unset
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "TelemetryConfig::default_queue_size")]
    pub queue_size: usize,
    #[serde(default = "TelemetryConfig::default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrontendConfig {
    /// Path to directory containing static frontend files
    /// If None, only the JSON API is served
    pub static_dir: Option<String>,
}

impl RegistryConfig {
    const fn default_validity_minutes() -> i64 {
        30
    }

    const fn default_max_code_attempts() -> u32 {
        10
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default_validity_minutes: Self::default_validity_minutes(),
            max_code_attempts: Self::default_max_code_attempts(),
        }
    }
}

impl TelemetryConfig {
    const fn default_queue_size() -> usize {
        1024
    }

    const fn default_timeout_ms() -> u64 {
        3000
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            token: None,
            queue_size: Self::default_queue_size(),
            timeout_ms: Self::default_timeout_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            redirect_server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            registry: RegistryConfig::default(),
            telemetry: TelemetryConfig::default(),
            frontend: FrontendConfig::default(),
            max_batch_size: 5,
            cors_allow_any: true,
        }
    }
}

/// Read `name`, falling back to `default` when unset, and parse it
fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{name} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let api_host =
            std::env::var("API_HOST").unwrap_or_else(|_| defaults.api_server.host.clone());
        let api_port = parse_var("API_PORT", defaults.api_server.port)?;

        let redirect_host = std::env::var("REDIRECT_HOST")
            .unwrap_or_else(|_| defaults.redirect_server.host.clone());
        let redirect_port = parse_var("REDIRECT_PORT", defaults.redirect_server.port)?;

        let default_validity_minutes = parse_var(
            "DEFAULT_VALIDITY_MINUTES",
            RegistryConfig::default_validity_minutes(),
        )?;
        let max_code_attempts = parse_var(
            "MAX_CODE_ATTEMPTS",
            RegistryConfig::default_max_code_attempts(),
        )?;
        let max_batch_size = parse_var("MAX_BATCH_SIZE", defaults.max_batch_size)?;

        let cors_allow_any = std::env::var("CORS_ALLOW_ANY")
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(defaults.cors_allow_any);

        let telemetry_endpoint = optional_var("TELEMETRY_ENDPOINT");
        let telemetry_token = optional_var("TELEMETRY_TOKEN");
        let telemetry_queue_size =
            parse_var("TELEMETRY_QUEUE_SIZE", TelemetryConfig::default_queue_size())?;
        let telemetry_timeout_ms =
            parse_var("TELEMETRY_TIMEOUT_MS", TelemetryConfig::default_timeout_ms())?;

        if telemetry_token.is_some() && telemetry_endpoint.is_none() {
            tracing::warn!("TELEMETRY_TOKEN is set but TELEMETRY_ENDPOINT is not; telemetry stays disabled");
        }

        let frontend_static_dir = optional_var("FRONTEND_STATIC_DIR");

        let config = Config {
            api_server: ServerConfig {
                host: api_host,
                port: api_port,
            },
            redirect_server: ServerConfig {
                host: redirect_host,
                port: redirect_port,
            },
            registry: RegistryConfig {
                default_validity_minutes,
                max_code_attempts,
            },
            telemetry: TelemetryConfig {
                endpoint: telemetry_endpoint,
                token: telemetry_token,
                queue_size: telemetry_queue_size,
                timeout_ms: telemetry_timeout_ms,
            },
            frontend: FrontendConfig {
                static_dir: frontend_static_dir,
            },
            max_batch_size,
            cors_allow_any,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.registry.default_validity_minutes <= 0 {
            bail!("DEFAULT_VALIDITY_MINUTES must be a positive number of minutes");
        }
        if self.registry.max_code_attempts == 0 {
            bail!("MAX_CODE_ATTEMPTS must be at least 1");
        }
        if self.max_batch_size == 0 {
            bail!("MAX_BATCH_SIZE must be at least 1");
        }
        if self.telemetry.queue_size == 0 {
            bail!("TELEMETRY_QUEUE_SIZE must be at least 1");
        }
        Ok(())
    }
}
