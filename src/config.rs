use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

/// Default OpenAI-compatible endpoint used when `OPENAI_BASE_URL` is unset.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// Model requested from the completion service when `OPENAI_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "gpt-4";
/// Sampling temperature used when `OPENAI_TEMPERATURE` is unset.
pub const DEFAULT_TEMPERATURE: f32 = 0.1;
/// Port the HTTP server binds when `SERVER_PORT` is unset.
pub const DEFAULT_SERVER_PORT: u16 = 8000;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the solver server.
#[derive(Debug, Clone)]
pub struct Config {
    /// Credential sent as a bearer token to the completion service.
    pub openai_api_key: String,
    /// Base URL of the OpenAI-compatible API (without the `/chat/completions` suffix).
    pub openai_base_url: String,
    /// Model identifier passed with every completion request.
    pub model: String,
    /// Sampling temperature passed with every completion request.
    pub temperature: f32,
    /// Optional upper bound on a single completion request; `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
    /// Interface the HTTP server binds to.
    pub server_host: String,
    /// Port the HTTP server binds to.
    pub server_port: u16,
    /// Directory used for staged uploads and archive scratch space.
    pub upload_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            openai_api_key: load_env("OPENAI_API_KEY")?,
            openai_base_url: load_env_optional("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            model: load_env_optional("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: parse_optional("OPENAI_TEMPERATURE")?.unwrap_or(DEFAULT_TEMPERATURE),
            request_timeout: parse_optional::<u64>("OPENAI_TIMEOUT_SECS")?
                .map(Duration::from_secs),
            server_host: load_env_optional("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: parse_optional("SERVER_PORT")?.unwrap_or(DEFAULT_SERVER_PORT),
            upload_dir: load_env_optional("UPLOAD_DIR").map(PathBuf::from),
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    load_env_optional(key).ok_or_else(|| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_optional<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() -> Result<&'static Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!(
        base_url = %config.openai_base_url,
        model = %config.model,
        temperature = config.temperature,
        timeout = ?config.request_timeout,
        server_port = config.server_port,
        upload_dir = ?config.upload_dir,
        "Loaded configuration"
    );
    Ok(CONFIG.get_or_init(|| config))
}
