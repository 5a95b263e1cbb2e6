//! Infrastructure layer: wire conversion and the WebSocket transport.

pub mod conversion;
pub mod websocket;

pub use conversion::{decode, encode};
pub use websocket::WebSocketConnector;
