use thiserror::Error;

/// A failed call to the completion endpoint. Always handled per row.
#[derive(Debug, Clone, Error)]
pub enum InferenceError {
    #[error("inference request failed: {0}")]
    Transport(String),

    #[error("inference endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed inference response: {0}")]
    MalformedResponse(String),

    #[error("inference response contained no message content")]
    EmptyReply,

    #[error("could not build inference request: {0}")]
    InvalidRequest(String),
}

impl InferenceError {
    /// Transport failures, rate limiting and server errors are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            InferenceError::Transport(_) => true,
            InferenceError::Status { status, .. } => *status == 429 || *status >= 500,
            InferenceError::MalformedResponse(_)
            | InferenceError::EmptyReply
            | InferenceError::InvalidRequest(_) => false,
        }
    }
}
