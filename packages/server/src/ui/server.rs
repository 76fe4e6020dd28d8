//! Server execution logic.

use std::{future::Future, sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use hirewire_shared::time::{Clock, SystemClock};

use crate::{
    config::ServerConfig,
    domain::{GroupBroker, TokenVerifier},
    infrastructure::{auth::JwtTokenVerifier, broker::InMemoryGroupBroker},
    usecase::NotificationEmitter,
};

use super::{
    handler::{health_check, notify, stats, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Notification gateway
///
/// # Example
///
/// ```ignore
/// let server = Server::from_config(&config);
/// let emitter = server.emitter();
/// server.run(config.host(), config.port()).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    /// Create a new Server instance
    ///
    /// # Arguments
    ///
    /// * `verifier` - Verifies handshake and `/api/notify` credentials
    /// * `broker` - Connection registry shared by the gate and the emitter
    /// * `clock` - Source of connect and emit timestamps
    /// * `heartbeat_interval` - Interval between server pings
    /// * `idle_timeout` - Silence after which a connection is dropped
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        broker: Arc<dyn GroupBroker>,
        clock: Arc<dyn Clock>,
        heartbeat_interval: Duration,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            state: Arc::new(AppState::new(
                verifier,
                broker,
                clock,
                heartbeat_interval,
                idle_timeout,
            )),
        }
    }

    /// Production wiring: JWT verifier, in-process broker, system clock.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            Arc::new(JwtTokenVerifier::new(config.jwt_secret())),
            Arc::new(InMemoryGroupBroker::new()),
            Arc::new(SystemClock),
            config.heartbeat_interval(),
            config.idle_timeout(),
        )
    }

    /// Handle for route handlers of the REST layer running in the same process.
    pub fn emitter(&self) -> NotificationEmitter {
        self.state.emitter.clone()
    }

    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/stats", get(stats))
            .route("/api/notify", post(notify))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the gateway until Ctrl+C or SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: &str, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!(
            "Notification gateway listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
    }
}
