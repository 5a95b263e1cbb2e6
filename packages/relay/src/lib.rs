//! Development message relay for Murmur.
//!
//! Speaks the realtime channel's wire protocol: the first frame of a
//! connection is a handshake that registers the sender, chat and typing
//! frames are routed to the participant named in `to`, and every join or
//! leave pushes a `userlist` presence envelope to connected participants.

pub mod handler;
pub mod registry;
pub mod server;
mod signal;
pub mod state;

pub use server::{router, run, serve};
pub use state::AppState;
