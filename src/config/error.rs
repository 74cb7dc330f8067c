//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
///
/// Every variant is fatal: the process refuses to start (or a one-shot run
/// refuses to touch the spreadsheet) until the environment is fixed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Port value is outside valid range (1-65535).
    #[error("invalid port '{value}': must be between 1 and 65535")]
    InvalidPort { value: String },

    /// Port string could not be parsed as a number.
    #[error("failed to parse port '{value}': {source}")]
    PortParseError {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Bind address string could not be parsed.
    #[error("failed to parse bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// A required environment variable was not set (or was blank).
    #[error("missing required environment variable: {name}")]
    MissingEnvVar { name: &'static str },

    /// Service-account credentials could not be read or are incomplete.
    #[error("invalid service account credentials: {reason}")]
    InvalidCredentials { reason: String },

    /// The credentials variable named a file that could not be read.
    #[error("failed to read credentials file {}: {source}", path.display())]
    CredentialsFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A tunable had a value outside its accepted domain.
    #[error("invalid value '{value}' for {name}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl ConfigError {
    /// Returns `true` for the credential-class failures (missing or unusable secrets).
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            ConfigError::MissingEnvVar { .. }
                | ConfigError::InvalidCredentials { .. }
                | ConfigError::CredentialsFile { .. }
        )
    }
}
