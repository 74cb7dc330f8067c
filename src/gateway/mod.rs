//! HTTP trigger (Axum) for batch runs.

pub mod error;
pub mod handler;
pub mod state;


use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{any, get},
};
use tower_http::trace::TraceLayer;

pub use error::{ErrorResponse, GatewayError};
pub use handler::analyze_handler;
pub use state::HandlerState;

use crate::classifier::CompletionClient;
use crate::constants::{NEWSDESK_STATUS_HEADER, NEWSDESK_STATUS_HEALTHY};
use crate::sheets::SheetStore;

pub fn create_router_with_state<S, C>(state: HandlerState<S, C>) -> Router
where
    S: SheetStore + 'static,
    C: CompletionClient + 'static,
{
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/api/analyze", any(analyze_handler::<S, C>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        NEWSDESK_STATUS_HEADER,
        HeaderValue::from_static(NEWSDESK_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}
