pub mod hub;
pub mod session;

pub use hub::{ClientCommand, ConnectionId, OrderHub, ServerEvent};
