mod connection;
mod event;
mod identity;
mod message;
mod room;

pub use connection::ConnectionId;
pub use event::{ClientEvent, ServerEvent};
pub use identity::Identity;
pub use message::ChatMessage;
pub use room::RoomDetails;
