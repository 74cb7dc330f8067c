use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{Instrument, error, info, instrument, warn};

use crate::batch::BatchSummary;
use crate::classifier::CompletionClient;
use crate::constants::{NEWSDESK_STATUS_COMPLETE, NEWSDESK_STATUS_HEADER, NEWSDESK_STATUS_PARTIAL};
use crate::gateway::error::GatewayError;
use crate::gateway::state::HandlerState;
use crate::sheets::SheetStore;

/// `/api/analyze`: runs one batch per `GET`. Other methods are refused before
/// anything is read.
#[instrument(skip(state, method), fields(method = %method))]
pub async fn analyze_handler<S, C>(
    State(state): State<HandlerState<S, C>>,
    method: Method,
) -> Result<Response, GatewayError>
where
    S: SheetStore + 'static,
    C: CompletionClient + 'static,
{
    if method != Method::GET {
        warn!("Rejected trigger with unsupported method");
        return Err(GatewayError::MethodNotAllowed);
    }

    let Ok(guard) = Arc::clone(&state.run_guard).try_lock_owned() else {
        warn!("Trigger received while a run is in flight");
        return Err(GatewayError::RunInProgress);
    };

    info!("Batch triggered");
    // Runs to completion even if the caller disconnects; the guard is released with the task.
    let scorer = Arc::clone(&state.scorer);
    let run = tokio::spawn(
        async move {
            let _guard = guard;
            scorer.run().await
        }
        .in_current_span(),
    );

    let summary = run
        .await
        .map_err(|err| {
            error!(error = %err, "Batch task aborted");
            GatewayError::RunAborted(err.to_string())
        })?
        .inspect_err(|err| {
            error!(error = %err, auth_failure = err.is_auth_failure(), "Batch run failed");
        })?;

    Ok(summary_response(summary))
}

fn summary_response(summary: BatchSummary) -> Response {
    let status = if summary.stopped_early {
        NEWSDESK_STATUS_PARTIAL
    } else {
        NEWSDESK_STATUS_COMPLETE
    };

    let mut headers = HeaderMap::new();
    headers.insert(NEWSDESK_STATUS_HEADER, HeaderValue::from_static(status));

    (StatusCode::OK, headers, Json(summary)).into_response()
}
