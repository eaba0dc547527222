//! Integration tests for roomcast-server.
//!
//! Tests are organized by functionality:
//! - `membership_tests` - create/join semantics and the creator race
//! - `lifecycle_tests` - kick, leave, disconnect cleanup
//! - `failure_tests` - persistence failures and rollback
//! - `relay_tests` - ready fanout and targeted signals
//! - `messaging_tests` - chat broadcast and bounded history


use crate::utils::{MockEventSink, MockRoomStore};
use roomcast_core::{ClientEvent, ConnectionId, Identity};
use roomcast_server::{ConnectionRegistry, Coordinator, MessageLog, RoomTable};
use std::sync::Arc;
use tracing::Level;

/// Initialize tracing for tests (call once per test).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn ann() -> Identity {
    Identity::new("ann@x.io", "ann")
}

pub fn bee() -> Identity {
    Identity::new("bee@x.io", "bee")
}

pub fn cat() -> Identity {
    Identity::new("cat@x.io", "cat")
}

/// A coordinator wired to mocks, plus handles to everything a test may
/// want to poke or verify.
pub struct TestHarness {
    pub coordinator: Arc<Coordinator>,
    pub sink: MockEventSink,
    pub store: MockRoomStore,
    pub table: Arc<RoomTable>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_users(vec![ann(), bee(), cat()])
    }

    pub fn with_users(users: Vec<Identity>) -> Self {
        Self::build(users, 100, 100)
    }

    pub fn with_room_capacity(room_capacity: usize) -> Self {
        Self::build(vec![ann(), bee(), cat()], room_capacity, 100)
    }

    pub fn with_log_capacity(log_capacity: usize) -> Self {
        Self::build(vec![ann(), bee(), cat()], 100, log_capacity)
    }

    fn build(users: Vec<Identity>, room_capacity: usize, log_capacity: usize) -> Self {
        let store = MockRoomStore::with_users(users);
        let sink = MockEventSink::new();
        let table = Arc::new(RoomTable::new(room_capacity));
        let registry = Arc::new(ConnectionRegistry::new());
        let messages = Arc::new(MessageLog::new(log_capacity));

        let coordinator = Arc::new(Coordinator::new(
            table.clone(),
            registry,
            messages,
            Arc::new(store.clone()),
            Arc::new(sink.clone()),
        ));

        Self {
            coordinator,
            sink,
            store,
            table,
        }
    }

    /// Open a connection: live sink entry plus registry record.
    pub fn connect(&self) -> ConnectionId {
        let connection_id = ConnectionId::new();
        self.sink.connect(&connection_id);
        self.coordinator.on_connect(connection_id.clone());
        connection_id
    }

    pub async fn join(&self, connection_id: &ConnectionId, room_name: &str, email: &str) {
        self.join_with_password(connection_id, room_name, email, None)
            .await;
    }

    pub async fn join_with_password(
        &self,
        connection_id: &ConnectionId,
        room_name: &str,
        email: &str,
        password: Option<&str>,
    ) {
        self.coordinator
            .handle_event(
                connection_id,
                ClientEvent::Join {
                    room_name: room_name.to_owned(),
                    email: email.to_owned(),
                    password: password.map(str::to_owned),
                },
            )
            .await;
    }

    pub async fn leave(&self, connection_id: &ConnectionId, room_name: &str) {
        self.coordinator
            .handle_event(
                connection_id,
                ClientEvent::LeaveRoom {
                    room_name: room_name.to_owned(),
                },
            )
            .await;
    }

    pub async fn kick(&self, connection_id: &ConnectionId, room_name: &str, target_email: &str) {
        self.coordinator
            .handle_event(
                connection_id,
                ClientEvent::KickUser {
                    room_name: room_name.to_owned(),
                    target_email: target_email.to_owned(),
                },
            )
            .await;
    }

    pub async fn send_message(&self, connection_id: &ConnectionId, room_name: &str, text: &str) {
        self.coordinator
            .handle_event(
                connection_id,
                ClientEvent::SendMessage {
                    room_name: room_name.to_owned(),
                    text: text.to_owned(),
                    sender_email: None,
                    timestamp: None,
                },
            )
            .await;
    }

    pub async fn request_history(&self, connection_id: &ConnectionId, room_name: &str) {
        self.coordinator
            .handle_event(
                connection_id,
                ClientEvent::RequestMessageHistory {
                    room_name: room_name.to_owned(),
                },
            )
            .await;
    }

    /// Simulate a transport disconnect: sink entry dropped, then the
    /// coordinator's cleanup transition.
    pub async fn disconnect(&self, connection_id: &ConnectionId) {
        self.sink.disconnect(connection_id);
        self.coordinator.handle_disconnect(connection_id).await;
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
