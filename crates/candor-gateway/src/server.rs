use std::net::SocketAddr;
use std::sync::Arc;

use candor_agents::AgentRuntime;
use candor_common::{Error, Result};
use candor_config::AppConfig;
use tokio::net::TcpListener;
use tracing::info;

use crate::router::build_router;
use crate::state::AppState;

pub struct GatewayServer {
    config: AppConfig,
    runtime: Arc<AgentRuntime>,
}

impl GatewayServer {
    pub fn new(config: AppConfig, runtime: Arc<AgentRuntime>) -> Self {
        Self { config, runtime }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.config.gateway.host, self.config.gateway.port)
    }

    /// Serve until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        let addr = self.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::Gateway(format!("failed to bind {addr}: {e}")))?;
        self.serve(listener).await
    }

    /// Serve on an already-bound listener.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let local: SocketAddr = listener.local_addr()?;
        let state = Arc::new(AppState::new(self.runtime));
        let app = build_router(state);

        info!("gateway listening on http://{}", local);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::Gateway(format!("server error: {e}")))
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        // Without a signal handler, run until the process is killed.
        Err(_) => std::future::pending::<()>().await,
    }
}
