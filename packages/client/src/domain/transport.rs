//! Transport seam between the channel and the socket implementation.
//!
//! The channel only sees text frames: a sink it writes JSON into and a
//! stream of JSON it reads from. The concrete implementation lives in
//! `infrastructure::websocket`; tests substitute fakes or mocks.

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::{Sink, Stream};
use thiserror::Error;

/// Outbound half of an established connection
pub type FrameSink = Pin<Box<dyn Sink<String, Error = TransportError> + Send>>;

/// Inbound half of an established connection. Ends when the peer closes.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String, TransportError>> + Send>>;

/// Transport errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Connection error: {0}")]
    Connect(String),

    #[error("Connection attempt timed out")]
    Timeout,

    #[error("Send error: {0}")]
    Send(String),

    #[error("Receive error: {0}")]
    Receive(String),
}

/// Opens connections to the message server
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Connector: Send + Sync {
    /// Establish a connection to `endpoint` and split it into halves.
    async fn connect(&self, endpoint: &str) -> Result<(FrameSink, FrameStream), TransportError>;
}
