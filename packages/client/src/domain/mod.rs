//! Domain model of the realtime channel.
//!
//! Pure types and rules with no I/O: participant identity, frames, the
//! bounded outbound queue, connection state, and reconnection policy. The
//! transport seam is declared here as a trait and implemented in the
//! infrastructure layer.

mod frame;
mod participant;
mod queue;
mod reconnect;
mod state;
mod transport;

pub use frame::{ChatMessage, Frame, Inbound, Presence, TypingNotice};
pub use participant::ParticipantId;
pub use queue::{Enqueued, OutboundQueue, OverflowPolicy};
pub use reconnect::{ReconnectPolicy, should_attempt_reconnect};
pub use state::ConnectionState;
pub use transport::{Connector, FrameSink, FrameStream, TransportError};

#[cfg(test)]
pub use transport::MockConnector;
