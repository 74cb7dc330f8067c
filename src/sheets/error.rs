use thiserror::Error;

/// Errors from the spreadsheet store.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// Token exchange or key handling failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The read call failed (transport, non-success status, or undecodable body).
    #[error("failed to read range {range}: {message}")]
    SourceUnavailable { range: String, message: String },

    /// The read succeeded but returned zero rows.
    #[error("no data found in range {range}")]
    EmptyDataset { range: String },

    /// The service refused the write (permissions, bad range) or the call failed.
    #[error("write rejected for {range}: {message}")]
    WriteRejected { range: String, message: String },

    /// A range string could not be parsed.
    #[error("invalid range '{value}': {reason}")]
    InvalidRange { value: String, reason: &'static str },
}

pub type SheetsResult<T> = Result<T, SheetsError>;
