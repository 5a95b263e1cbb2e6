//! Error types for the realtime channel.

use thiserror::Error;

use crate::domain::Frame;

/// Channel-level errors surfaced to callers
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Participant ID is empty or blank
    #[error("Invalid participant ID: '{0}'")]
    InvalidParticipantId(String),

    /// Configuration rejected by validation
    #[error("Invalid channel configuration: {0}")]
    InvalidConfig(String),

    /// The outbound queue is full and the overflow policy rejects new frames
    #[error("Outbound queue is full ({capacity} frames)")]
    QueueFull {
        capacity: usize,
        /// The rejected frame, handed back to the caller
        frame: Box<Frame>,
    },
}
