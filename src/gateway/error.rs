use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::batch::BatchError;
use crate::constants::{NEWSDESK_STATUS_BUSY, NEWSDESK_STATUS_ERROR, NEWSDESK_STATUS_HEADER};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("a batch run is already in progress")]
    RunInProgress,

    #[error("An error occurred while processing articles")]
    RunFailed(#[from] BatchError),

    #[error("An error occurred while processing articles")]
    RunAborted(String),
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();

        let (status, body, newsdesk_status) = match &self {
            GatewayError::MethodNotAllowed => {
                headers.insert(header::ALLOW, HeaderValue::from_static("GET"));
                (
                    StatusCode::METHOD_NOT_ALLOWED,
                    ErrorResponse {
                        error: self.to_string(),
                        details: None,
                    },
                    NEWSDESK_STATUS_ERROR,
                )
            }
            GatewayError::RunInProgress => (
                StatusCode::CONFLICT,
                ErrorResponse {
                    error: "Batch already running".to_string(),
                    details: Some(self.to_string()),
                },
                NEWSDESK_STATUS_BUSY,
            ),
            GatewayError::RunFailed(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: self.to_string(),
                    details: Some(err.to_string()),
                },
                NEWSDESK_STATUS_ERROR,
            ),
            GatewayError::RunAborted(reason) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: self.to_string(),
                    details: Some(format!("batch task aborted: {reason}")),
                },
                NEWSDESK_STATUS_ERROR,
            ),
        };

        headers.insert(
            NEWSDESK_STATUS_HEADER,
            HeaderValue::from_static(newsdesk_status),
        );

        (status, headers, Json(body)).into_response()
    }
}
