//! Request handlers for the relay.

pub mod http;
pub mod websocket;

pub use http::{health_check, online_participants};
pub use websocket::websocket_handler;
