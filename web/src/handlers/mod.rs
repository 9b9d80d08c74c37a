//! HTTP handlers, grouped by resource.

pub mod events;
pub mod health;
pub mod reservations;
pub mod users;

use serde::Serialize;

/// Plain confirmation body, e.g. `{"message": "Logged out successfully"}`.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable outcome
    pub message: &'static str,
}

impl MessageResponse {
    /// Wrap a message.
    #[must_use]
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }
}
