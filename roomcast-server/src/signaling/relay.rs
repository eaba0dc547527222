use crate::registry::ConnectionRegistry;
use crate::room::RoomTable;
use crate::signaling::EventSink;
use roomcast_core::{ConnectionId, ServerEvent};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Offer,
    Answer,
    IceCandidate,
}

/// Routes WebRTC handshake signals between connections. Holds no room
/// state of its own; membership is read from the live table and targets
/// are resolved through the registry at relay time.
pub struct SignalRelay {
    table: Arc<RoomTable>,
    registry: Arc<ConnectionRegistry>,
    sink: Arc<dyn EventSink>,
}

impl SignalRelay {
    pub fn new(
        table: Arc<RoomTable>,
        registry: Arc<ConnectionRegistry>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            table,
            registry,
            sink,
        }
    }

    /// Fan the `ready` signal out to every other live member of the room.
    pub async fn relay_ready(&self, room_name: &str, from: &ConnectionId) {
        let Some(identity) = self.registry.identity_of(from) else {
            return;
        };
        let Some(members) = self.table.members(room_name) else {
            return;
        };

        for member in members {
            if member.email == identity.email {
                continue;
            }
            let Some(target) = self.live_connection(&member.email) else {
                continue;
            };
            self.sink
                .send(
                    target,
                    ServerEvent::Ready {
                        from: from.clone(),
                        identity: identity.clone(),
                    },
                )
                .await;
        }
    }

    /// Forward an offer/answer/ICE signal to exactly one connection. A
    /// vanished target means the signal is dropped, not retried: handshake
    /// messages are not safe to replay blindly.
    pub async fn relay_to_target(
        &self,
        kind: SignalKind,
        payload: Value,
        from: &ConnectionId,
        target: ConnectionId,
    ) {
        if !self.sink.is_connected(&target) {
            debug!(
                "Dropping {:?} signal from {} to vanished connection {}",
                kind, from, target
            );
            return;
        }

        let from = from.clone();
        let event = match kind {
            SignalKind::Offer => ServerEvent::Offer { payload, from },
            SignalKind::Answer => ServerEvent::Answer { payload, from },
            SignalKind::IceCandidate => ServerEvent::IceCandidate { payload, from },
        };
        self.sink.send(target, event).await;
    }

    /// Broadcast a stream-teardown notice to the rest of the room.
    pub async fn relay_stream_stopped(&self, room_name: &str, from: &ConnectionId) {
        let Some(identity) = self.registry.identity_of(from) else {
            return;
        };
        let Some(members) = self.table.members(room_name) else {
            return;
        };

        for member in members {
            if member.email == identity.email {
                continue;
            }
            let Some(target) = self.live_connection(&member.email) else {
                continue;
            };
            self.sink
                .send(
                    target,
                    ServerEvent::StreamStopped {
                        room_name: room_name.to_owned(),
                    },
                )
                .await;
        }
    }

    /// Resolve an identity to a live connection, evicting a mapping whose
    /// transport already closed.
    fn live_connection(&self, email: &str) -> Option<ConnectionId> {
        let connection_id = self.registry.resolve(email)?;
        if self.sink.is_connected(&connection_id) {
            Some(connection_id)
        } else {
            debug!("Registry mapping for {} is stale, evicting", email);
            self.registry.evict(email);
            None
        }
    }
}
