//! Newsdesk scorer entrypoint.
//!
//! Serves the HTTP trigger by default. `--run-once` runs a single batch and
//! prints the summary; `--health-check` checks a running server.

use std::net::SocketAddr;
use std::process::ExitCode;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use newsdesk::batch::BatchScorer;
use newsdesk::config::Config;
use newsdesk::gateway::{HandlerState, create_router_with_state};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    if std::env::args().any(|arg| arg == "--health-check") {
        return Ok(run_health_check().await);
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    let scorer = BatchScorer::from_config(&config)?;

    if std::env::args().any(|arg| arg == "--run-once") {
        return run_once(scorer).await;
    }

    let addr: SocketAddr = config.socket_addr().parse()?;
    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        range = %config.range,
        model = %config.model,
        "Newsdesk scorer starting"
    );

    let app = create_router_with_state(HandlerState::new(scorer));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Newsdesk scorer shutdown complete");
    Ok(ExitCode::SUCCESS)
}

async fn run_once<S, C>(scorer: BatchScorer<S, C>) -> anyhow::Result<ExitCode>
where
    S: newsdesk::sheets::SheetStore,
    C: newsdesk::classifier::CompletionClient,
{
    match scorer.run().await {
        Ok(summary) => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            tracing::error!(error = %err, auth_failure = err.is_auth_failure(), "Batch run failed");
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run_health_check() -> ExitCode {
    let port = std::env::var("NEWSDESK_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{port}/healthz");

    let Ok(client) = reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()
    else {
        return ExitCode::FAILURE;
    };

    match client.get(&url).send().await {
        Ok(res) if res.status().is_success() => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
