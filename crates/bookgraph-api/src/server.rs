use crate::{create_router, AppState};
use anyhow::Context;
use bookgraph_core::Settings;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{info, warn};

pub struct Server {
    state: AppState,
    addr: SocketAddr,
}

impl Server {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
            .parse()
            .with_context(|| {
                format!(
                    "invalid listen address {}:{}",
                    settings.server.host, settings.server.port
                )
            })?;
        let state = AppState::new(settings)?;
        Ok(Self { state, addr })
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let router = create_router(self.state);

        info!("Starting BookGraph API server on {}", self.addr);
        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .with_context(|| format!("failed to bind {}", self.addr))?;

        info!("GraphQL endpoint available at http://{}/graphql", self.addr);
        info!("GraphiQL UI available at http://{}/graphiql", self.addr);
        info!("GraphQL subscriptions over WebSocket at ws://{}/graphql/ws", self.addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("server error")?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {}", e);
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
                warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully");
        },
    }
}
