use dashmap::DashMap;
use roomcast_core::{ConnectionId, Identity};
use std::collections::HashSet;
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct ConnectionRecord {
    pub identity: Option<Identity>,
    pub joined_rooms: HashSet<String>,
}

/// Реестр живых соединений: отображение identity -> connection
/// плюс запись о самом соединении на время его жизни.
#[derive(Default)]
pub struct ConnectionRegistry {
    by_email: DashMap<String, ConnectionId>,
    connections: DashMap<ConnectionId, ConnectionRecord>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_connection(&self, connection_id: ConnectionId) {
        self.connections
            .insert(connection_id, ConnectionRecord::default());
    }

    /// Attach an identity to a connection. Last write wins on the identity
    /// key: a user reconnecting from a new tab takes the mapping over, the
    /// old connection keeps its record until it disconnects.
    pub fn register(&self, connection_id: &ConnectionId, identity: Identity) {
        if let Some(previous) = self
            .by_email
            .insert(identity.email.clone(), connection_id.clone())
            && previous != *connection_id
        {
            info!(
                "Identity {} moved from connection {} to {}",
                identity.email, previous, connection_id
            );
        }

        if let Some(mut record) = self.connections.get_mut(connection_id) {
            record.identity = Some(identity);
        }
    }

    pub fn resolve(&self, email: &str) -> Option<ConnectionId> {
        self.by_email.get(email).map(|entry| entry.value().clone())
    }

    /// Drop a stale identity mapping noticed by a caller whose resolved
    /// connection turned out to be dead.
    pub fn evict(&self, email: &str) {
        if self.by_email.remove(email).is_some() {
            debug!("Evicted stale mapping for {}", email);
        }
    }

    /// Remove the connection record and, if the identity mapping still
    /// points at this connection, the mapping too. A mapping already taken
    /// over by a reconnect is left alone.
    pub fn unregister(&self, connection_id: &ConnectionId) -> Option<ConnectionRecord> {
        let (_, record) = self.connections.remove(connection_id)?;

        if let Some(identity) = &record.identity {
            self.by_email
                .remove_if(&identity.email, |_, mapped| mapped == connection_id);
        }

        Some(record)
    }

    pub fn identity_of(&self, connection_id: &ConnectionId) -> Option<Identity> {
        self.connections
            .get(connection_id)
            .and_then(|record| record.identity.clone())
    }

    pub fn note_joined(&self, connection_id: &ConnectionId, room_name: &str) {
        if let Some(mut record) = self.connections.get_mut(connection_id) {
            record.joined_rooms.insert(room_name.to_owned());
        }
    }

    pub fn note_left(&self, connection_id: &ConnectionId, room_name: &str) {
        if let Some(mut record) = self.connections.get_mut(connection_id) {
            record.joined_rooms.remove(room_name);
        }
    }
}
