pub mod config;
pub mod errors;
pub mod registry;
pub mod room;
pub mod signaling;
pub mod store;

pub use config::ServerConfig;
pub use errors::RelayError;
pub use registry::ConnectionRegistry;
pub use room::{Coordinator, JoinOutcome, MessageLog, RemovalOutcome, Role, RoomState, RoomTable};
pub use signaling::{AppState, EventSink, SignalKind, SignalRelay, SignalingService, ws_handler};
pub use store::{MemoryStore, RoomRecord, RoomStore, StoreError};
