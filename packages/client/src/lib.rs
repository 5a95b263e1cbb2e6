//! Realtime messaging channel for the Murmur chat client.
//!
//! The [`channel::RealtimeChannel`] owns one persistent socket connection,
//! queues outbound frames while that connection is not open, and publishes
//! inbound frames and connection events to subscribers.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;

pub mod channel;
pub mod config;
pub mod error;
