//! Test server harness.

use std::net::SocketAddr;
use std::time::Duration;

use newsdesk::batch::BatchScorer;
use newsdesk::classifier::CompletionClient;
use newsdesk::gateway::{HandlerState, create_router_with_state};
use newsdesk::sheets::SheetStore;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const STARTUP_WAIT_TIMEOUT: Duration = Duration::from_secs(5);
const STARTUP_POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct TestServer {
    pub addr: SocketAddr,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
}

pub async fn wait_for_server_ready(addr: SocketAddr) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > STARTUP_WAIT_TIMEOUT {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => tokio::time::sleep(STARTUP_POLL_INTERVAL).await,
        }
    }
}

/// Serves `scorer` behind the real router on an ephemeral port.
pub async fn spawn_test_server<S, C>(
    scorer: BatchScorer<S, C>,
) -> Result<TestServer, ServerStartupError>
where
    S: SheetStore + 'static,
    C: CompletionClient + 'static,
{
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let addr = listener.local_addr()?;

    let app = create_router_with_state(HandlerState::new(scorer));
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await;
    });

    wait_for_server_ready(addr).await?;

    Ok(TestServer {
        addr,
        _server_handle: handle,
        shutdown_tx: Some(shutdown_tx),
    })
}
