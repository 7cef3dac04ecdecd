use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Port used when `PORT` is not provided.
pub const DEFAULT_PORT: u16 = 5000;
/// Chat model used when `OPENAI_MODEL` is not provided.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
/// Chat completions host used when `OPENAI_BASE_URL` is not provided.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
/// Timeout applied to every vendor call unless `UPSTREAM_TIMEOUT_SECS` overrides it.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 60;
/// Largest accepted upload; matches the synchronous Textract document limit.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
/// Log file used when `OCR_SUMMARY_LOG_FILE` is not provided.
pub const DEFAULT_LOG_FILE: &str = "logs/ocr-summary.log";

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

/// Runtime configuration for the OCR summary server.
///
/// Built once at process start and shared by reference; nothing here changes afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    /// AWS region hosting the Textract endpoint.
    pub aws_region: String,
    /// Access key id used to sign Textract requests.
    pub aws_access_key: String,
    /// Secret key paired with `aws_access_key`.
    pub aws_secret_key: String,
    /// Optional Textract endpoint override (LocalStack and friends).
    pub textract_endpoint: Option<String>,
    /// API key for the chat completions service.
    pub openai_api_key: String,
    /// Base URL of the chat completions service.
    pub openai_base_url: String,
    /// Model identifier sent with each completion request.
    pub openai_model: String,
    /// Port the HTTP server listens on.
    pub server_port: u16,
    /// Timeout applied uniformly to vendor calls.
    pub upstream_timeout: Duration,
    /// Maximum accepted multipart body size in bytes.
    pub max_upload_bytes: usize,
    /// File the tracing file layer appends to.
    pub log_file: PathBuf,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            non_empty(lookup(key)).ok_or_else(|| ConfigError::MissingVariable(key.to_string()))
        };
        let optional = |key: &str| non_empty(lookup(key));

        Ok(Self {
            aws_region: required("AWS_REGION")?,
            aws_access_key: required("AWS_ACCESS_KEY")?,
            aws_secret_key: required("AWS_SECRET_KEY")?,
            textract_endpoint: optional("TEXTRACT_ENDPOINT"),
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_base_url: optional("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            openai_model: optional("OPENAI_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            server_port: parse_optional(optional("PORT"), "PORT")?.unwrap_or(DEFAULT_PORT),
            upstream_timeout: parse_timeout(
                optional("UPSTREAM_TIMEOUT_SECS"),
                "UPSTREAM_TIMEOUT_SECS",
            )?,
            max_upload_bytes: parse_optional(optional("MAX_UPLOAD_BYTES"), "MAX_UPLOAD_BYTES")?
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            log_file: optional("OCR_SUMMARY_LOG_FILE")
                .map_or_else(|| PathBuf::from(DEFAULT_LOG_FILE), PathBuf::from),
        })
    }

    /// Log the non-secret values at debug level. Call once tracing is installed.
    pub fn log_summary(&self) {
        tracing::debug!(
            aws_region = %self.aws_region,
            textract_endpoint = ?self.textract_endpoint,
            openai_base_url = %self.openai_base_url,
            openai_model = %self.openai_model,
            server_port = self.server_port,
            upstream_timeout_secs = self.upstream_timeout.as_secs(),
            max_upload_bytes = self.max_upload_bytes,
            log_file = %self.log_file.display(),
            "Loaded configuration"
        );
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn parse_optional<T: std::str::FromStr>(
    value: Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

/// A zero timeout would fail every vendor call immediately, so it is rejected.
fn parse_timeout(value: Option<String>, key: &str) -> Result<Duration, ConfigError> {
    match parse_optional::<u64>(value, key)? {
        Some(0) => Err(ConfigError::InvalidValue(key.to_string())),
        secs => Ok(Duration::from_secs(
            secs.unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        )),
    }
}

/// Load `.env` (when present) into the process environment.
pub fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        eprintln!("Loaded environment from {}", path.display());
    }
}
