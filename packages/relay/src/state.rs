//! Relay state.

use crate::registry::Registry;

/// Shared application state
#[derive(Default)]
pub struct AppState {
    /// Connected participants and their outbound queues
    pub registry: Registry,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}
