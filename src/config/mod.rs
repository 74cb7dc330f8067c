//! Environment-backed configuration.
//!
//! Credentials (`GOOGLE_APPLICATION_CREDENTIALS`, `SPREADSHEET_ID`,
//! `PERPLEXITY_API_KEY`) are required. Everything else has a default and can be
//! overridden with `NEWSDESK_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_ARTICLES_RANGE, DEFAULT_INFERENCE_URL, DEFAULT_MODEL, DEFAULT_PROMOTION_CAP,
    DEFAULT_REQUEST_DELAY, DEFAULT_SHEETS_BASE_URL, DEFAULT_TIME_BUDGET,
};
use crate::sheets::{ServiceAccountKey, SheetRange};

/// Job configuration loaded once at startup and handed to every component.
///
/// Use [`Config::from_env`] followed by [`Config::validate`].
#[derive(Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Service account used for the spreadsheet API.
    pub credentials: ServiceAccountKey,

    /// Spreadsheet holding the article queue.
    pub spreadsheet_id: String,

    /// Bearer token for the inference endpoint.
    pub inference_api_key: String,

    /// Range fetched on every run. Default: `Articles!A2:F`.
    pub range: String,

    /// Spreadsheet API base URL.
    pub sheets_base_url: String,

    /// Chat completion endpoint.
    pub inference_url: String,

    /// Model identifier sent with every completion request.
    pub model: String,

    /// Pause between article analyses. Default: 1s.
    pub request_delay: Duration,

    /// Wall-clock ceiling for one run. Default: 50s.
    pub time_budget: Duration,

    /// Maximum promotions per run; `None` disables the cap. Default: `Some(2)`.
    pub promotion_cap: Option<u32>,

    /// Related articles scoring below this are rejected. Default: disabled.
    pub min_score: Option<u32>,

    /// Whether the body excerpt is appended to the prompt. Default: `true`.
    pub include_body: bool,

    /// Whether inference failures are written back as error rows. Default: `true`.
    pub mark_errors: bool,

    /// Extra attempts for retryable inference failures. Default: `0`.
    pub inference_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            credentials: ServiceAccountKey::default(),
            spreadsheet_id: String::new(),
            inference_api_key: String::new(),
            range: DEFAULT_ARTICLES_RANGE.to_string(),
            sheets_base_url: DEFAULT_SHEETS_BASE_URL.to_string(),
            inference_url: DEFAULT_INFERENCE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            request_delay: DEFAULT_REQUEST_DELAY,
            time_budget: DEFAULT_TIME_BUDGET,
            promotion_cap: Some(DEFAULT_PROMOTION_CAP),
            min_score: None,
            include_body: true,
            mark_errors: true,
            inference_retries: 0,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("bind_addr", &self.bind_addr)
            .field("credentials", &self.credentials)
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("inference_api_key", &"<redacted>")
            .field("range", &self.range)
            .field("sheets_base_url", &self.sheets_base_url)
            .field("inference_url", &self.inference_url)
            .field("model", &self.model)
            .field("request_delay", &self.request_delay)
            .field("time_budget", &self.time_budget)
            .field("promotion_cap", &self.promotion_cap)
            .field("min_score", &self.min_score)
            .field("include_body", &self.include_body)
            .field("mark_errors", &self.mark_errors)
            .field("inference_retries", &self.inference_retries)
            .finish()
    }
}

impl Config {
    const ENV_CREDENTIALS: &'static str = "GOOGLE_APPLICATION_CREDENTIALS";
    const ENV_SPREADSHEET_ID: &'static str = "SPREADSHEET_ID";
    const ENV_API_KEY: &'static str = "PERPLEXITY_API_KEY";
    const ENV_PORT: &'static str = "NEWSDESK_PORT";
    const ENV_BIND_ADDR: &'static str = "NEWSDESK_BIND_ADDR";
    const ENV_RANGE: &'static str = "NEWSDESK_RANGE";
    const ENV_SHEETS_BASE_URL: &'static str = "NEWSDESK_SHEETS_BASE_URL";
    const ENV_INFERENCE_URL: &'static str = "NEWSDESK_INFERENCE_URL";
    const ENV_MODEL: &'static str = "NEWSDESK_MODEL";
    const ENV_REQUEST_DELAY_MS: &'static str = "NEWSDESK_REQUEST_DELAY_MS";
    const ENV_TIME_BUDGET_SECS: &'static str = "NEWSDESK_TIME_BUDGET_SECS";
    const ENV_PROMOTION_CAP: &'static str = "NEWSDESK_PROMOTION_CAP";
    const ENV_MIN_SCORE: &'static str = "NEWSDESK_MIN_SCORE";
    const ENV_INCLUDE_BODY: &'static str = "NEWSDESK_INCLUDE_BODY";
    const ENV_MARK_ERRORS: &'static str = "NEWSDESK_MARK_ERRORS";
    const ENV_INFERENCE_RETRIES: &'static str = "NEWSDESK_INFERENCE_RETRIES";

    /// Loads configuration from environment variables (falling back to defaults).
    ///
    /// Fails with [`ConfigError::MissingEnvVar`] when a credential is absent.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let credentials = Self::parse_credentials_from_env()?;
        let spreadsheet_id = Self::parse_required_from_env(Self::ENV_SPREADSHEET_ID)?;
        let inference_api_key = Self::parse_required_from_env(Self::ENV_API_KEY)?;

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let range = Self::parse_string_from_env(Self::ENV_RANGE, defaults.range);
        let sheets_base_url =
            Self::parse_string_from_env(Self::ENV_SHEETS_BASE_URL, defaults.sheets_base_url);
        let inference_url =
            Self::parse_string_from_env(Self::ENV_INFERENCE_URL, defaults.inference_url);
        let model = Self::parse_string_from_env(Self::ENV_MODEL, defaults.model);
        let request_delay = Self::parse_u64_from_env(Self::ENV_REQUEST_DELAY_MS)
            .map(Duration::from_millis)
            .unwrap_or(defaults.request_delay);
        let time_budget = Self::parse_u64_from_env(Self::ENV_TIME_BUDGET_SECS)
            .map(Duration::from_secs)
            .unwrap_or(defaults.time_budget);
        let promotion_cap = Self::parse_promotion_cap_from_env(defaults.promotion_cap);
        let min_score = Self::parse_min_score_from_env()?;
        let include_body = Self::parse_bool_from_env(Self::ENV_INCLUDE_BODY, defaults.include_body);
        let mark_errors = Self::parse_bool_from_env(Self::ENV_MARK_ERRORS, defaults.mark_errors);
        let inference_retries = Self::parse_u64_from_env(Self::ENV_INFERENCE_RETRIES)
            .map(|v| v.min(u32::MAX as u64) as u32)
            .unwrap_or(defaults.inference_retries);

        Ok(Self {
            port,
            bind_addr,
            credentials,
            spreadsheet_id,
            inference_api_key,
            range,
            sheets_base_url,
            inference_url,
            model,
            request_delay,
            time_budget,
            promotion_cap,
            min_score,
            include_body,
            mark_errors,
            inference_retries,
        })
    }

    /// Validates credentials and basic invariants. Performs no I/O.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.credentials.validate()?;

        if self.spreadsheet_id.trim().is_empty() {
            return Err(ConfigError::MissingEnvVar {
                name: Self::ENV_SPREADSHEET_ID,
            });
        }
        if self.inference_api_key.trim().is_empty() {
            return Err(ConfigError::MissingEnvVar {
                name: Self::ENV_API_KEY,
            });
        }

        SheetRange::parse(&self.range).map_err(|_| ConfigError::InvalidValue {
            name: Self::ENV_RANGE,
            value: self.range.clone(),
            reason: "expected a range like 'Articles!A2:F'",
        })?;

        if self.time_budget.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_TIME_BUDGET_SECS,
                value: "0".to_string(),
                reason: "time budget must be positive",
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_credentials_from_env() -> Result<ServiceAccountKey, ConfigError> {
        let raw = Self::parse_required_from_env(Self::ENV_CREDENTIALS)?;
        let trimmed = raw.trim();

        // Inline JSON blob, or a path to the downloaded key file.
        let json = if trimmed.starts_with('{') {
            trimmed.to_string()
        } else {
            let path = PathBuf::from(trimmed);
            std::fs::read_to_string(&path)
                .map_err(|source| ConfigError::CredentialsFile { path, source })?
        };

        ServiceAccountKey::from_json(&json)
    }

    fn parse_required_from_env(var_name: &'static str) -> Result<String, ConfigError> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingEnvVar { name: var_name })
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_promotion_cap_from_env(default: Option<u32>) -> Option<u32> {
        match env::var(Self::ENV_PROMOTION_CAP) {
            Ok(value) => {
                let value = value.trim().to_lowercase();
                if value == "none" || value == "0" {
                    return None;
                }
                value.parse().ok().or(default)
            }
            Err(_) => default,
        }
    }

    fn parse_min_score_from_env() -> Result<Option<u32>, ConfigError> {
        let Ok(value) = env::var(Self::ENV_MIN_SCORE) else {
            return Ok(None);
        };
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        match trimmed.parse::<u32>() {
            Ok(score) if (1..=10).contains(&score) => Ok(Some(score)),
            _ => Err(ConfigError::InvalidValue {
                name: Self::ENV_MIN_SCORE,
                value,
                reason: "must be an integer between 1 and 10",
            }),
        }
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(default)
    }

    fn parse_u64_from_env(var_name: &str) -> Option<u64> {
        env::var(var_name).ok().and_then(|v| v.trim().parse().ok())
    }

    fn parse_bool_from_env(var_name: &str, default: bool) -> bool {
        env::var(var_name)
            .map(|s| s != "false" && s != "0")
            .unwrap_or(default)
    }
}
