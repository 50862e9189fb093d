//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use chitchat_shared::{
    protocol::{CONNECT_PATH, STREAM_PATH},
    time::SystemWallClock,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    domain::{EventBroadcaster, SessionRegistry},
    infrastructure::{EvictionReceiver, InMemorySessionRegistry, QueueBroadcaster},
    usecase::{
        ConnectSessionUseCase, DisconnectSessionUseCase, ListSessionsUseCase, OpenStreamUseCase,
        SendMessageUseCase,
    },
};

use super::{
    handler::{connect, health_check, list_sessions, stream_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Broadcast chat server
///
/// # Example
///
/// ```ignore
/// let config = ServerConfig::default();
/// let server = Server::from_config(&config);
/// server.run(&config).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
    /// Eviction notices from the broadcaster, drained by the reaper task
    evictions: EvictionReceiver,
}

impl Server {
    /// Create a new Server instance from already wired use cases
    pub fn new(state: AppState, evictions: EvictionReceiver) -> Self {
        Self {
            state: Arc::new(state),
            evictions,
        }
    }

    /// Wire the in-memory registry, the queue broadcaster and the use cases
    /// around a fresh clock of the configured kind.
    pub fn from_config(config: &ServerConfig) -> Self {
        let clock = config.clock.build(&config.node_id);
        let registry: Arc<dyn SessionRegistry> = Arc::new(InMemorySessionRegistry::new(
            clock.clone(),
            Arc::new(SystemWallClock),
            config.queue_capacity,
        ));
        let (broadcaster, evictions) = QueueBroadcaster::new(registry.clone());
        let broadcaster: Arc<dyn EventBroadcaster> = Arc::new(broadcaster);

        let state = AppState {
            connect_session_usecase: Arc::new(ConnectSessionUseCase::new(
                registry.clone(),
                broadcaster.clone(),
            )),
            open_stream_usecase: Arc::new(OpenStreamUseCase::new(registry.clone())),
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                clock.clone(),
                broadcaster.clone(),
                config.max_message_length,
            )),
            disconnect_session_usecase: Arc::new(DisconnectSessionUseCase::new(
                registry.clone(),
                broadcaster,
                clock,
            )),
            list_sessions_usecase: Arc::new(ListSessionsUseCase::new(registry)),
            stream_open_timeout: config.stream_open_timeout,
        };

        Self::new(state, evictions)
    }

    /// Run the chat server on the configured address until Ctrl+C or SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, config: &ServerConfig) -> std::io::Result<()> {
        let bind_addr = config.bind_addr();
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Chat server listening on {}", listener.local_addr()?);
        tracing::info!("Handshake: POST http://{}{}", bind_addr, CONNECT_PATH);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// Starts the eviction reaper for the lifetime of the server. On shutdown
    /// every live session is disconnected so open streams end.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let reaper = self
            .state
            .disconnect_session_usecase
            .clone()
            .spawn_reaper(self.evictions);

        let disconnect = self.state.disconnect_session_usecase.clone();
        let app = router(self.state);

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                let disconnected = disconnect.disconnect_all().await;
                tracing::info!("Disconnected {} session(s)", disconnected);
            })
            .await;

        reaper.abort();
        result
    }
}

/// Routes of the chat server
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // WebSocket エンドポイント
        .route(STREAM_PATH, get(stream_handler))
        // HTTP エンドポイント
        .route(CONNECT_PATH, post(connect))
        .route("/api/health", get(health_check))
        .route("/api/sessions", get(list_sessions))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
