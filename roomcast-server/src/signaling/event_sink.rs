use async_trait::async_trait;
use roomcast_core::{ConnectionId, ServerEvent};

/// Трейт, который должна реализовать транспортная система (WebSocket
/// сервер), чтобы координатор и реле могли доставлять события клиентам.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Отправить событие конкретному соединению.
    async fn send(&self, connection_id: ConnectionId, event: ServerEvent);

    /// Живо ли ещё соединение (есть ли у него открытый канал отправки).
    fn is_connected(&self, connection_id: &ConnectionId) -> bool;
}
