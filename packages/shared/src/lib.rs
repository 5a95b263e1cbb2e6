//! Shared building blocks for the Murmur client and relay.

pub mod logger;
pub mod time;
pub mod wire;
