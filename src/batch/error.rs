use thiserror::Error;

use crate::config::ConfigError;
use crate::sheets::SheetsError;

/// Failures that abort a whole run. Per-row failures never surface here.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Reading the article range failed, or it was empty.
    #[error(transparent)]
    Fetch(#[from] SheetsError),

    #[error("invalid batch configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl BatchError {
    /// Credential problems, as opposed to an unreachable or empty sheet.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            BatchError::Fetch(SheetsError::Auth(_)) => true,
            BatchError::Fetch(_) => false,
            BatchError::Config(err) => err.is_auth_failure(),
            BatchError::HttpClient(_) => false,
        }
    }
}
