use axum::{Router, routing::get};
use roomcast_server::{
    AppState, ConnectionRegistry, Coordinator, MemoryStore, MessageLog, RoomTable, ServerConfig,
    SignalingService, ws_handler,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env()?;
    info!("Initializing roomcast signaling server");

    let store = Arc::new(MemoryStore::with_users(config.seed_users.clone()));
    let table = Arc::new(RoomTable::new(config.room_capacity));
    let registry = Arc::new(ConnectionRegistry::new());
    let messages = Arc::new(MessageLog::new(config.message_log_capacity));

    let signaling = SignalingService::new();
    let coordinator = Arc::new(Coordinator::new(
        table,
        registry,
        messages,
        store,
        Arc::new(signaling.clone()),
    ));

    let state = Arc::new(AppState {
        signaling,
        coordinator,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(state);

    info!("Signaling server listening on http://{}", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
