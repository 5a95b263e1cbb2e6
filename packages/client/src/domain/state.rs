//! Connection state machine.

/// Readiness of the channel's connection
///
/// `Idle → Connecting → Open → Closed`; a new `connect` is only accepted from
/// `Idle` or `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Never connected
    Idle,
    /// Connection attempt in progress
    Connecting,
    /// Handshake sent, frames are transmitted immediately
    Open,
    /// Connection ended or failed
    Closed,
}

impl ConnectionState {
    /// Whether `connect` may start a new attempt from this state.
    pub fn accepts_connect(self) -> bool {
        matches!(self, Self::Idle | Self::Closed)
    }

    pub fn is_open(self) -> bool {
        self == Self::Open
    }
}
