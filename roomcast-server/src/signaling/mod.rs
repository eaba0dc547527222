mod event_sink;
mod relay;
mod service;
mod ws_handler;

pub use event_sink::*;
pub use relay::*;
pub use service::*;
pub use ws_handler::*;
