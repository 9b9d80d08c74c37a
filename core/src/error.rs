//! Error taxonomy shared by every Vibe crate.

use thiserror::Error;

/// Result type alias for domain operations.
pub type Result<T> = std::result::Result<T, VibeError>;

/// Every failure a service or repository can report.
///
/// The web layer maps each variant onto an HTTP status; nothing here knows
/// about HTTP.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VibeError {
    /// Referenced event, reservation or user does not exist.
    #[error("{resource} with id {id} not found")]
    NotFound {
        /// Kind of resource ("Event", "Reservation", "User")
        resource: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// Capacity exhausted, duplicate reservation, duplicate email.
    #[error("{0}")]
    Conflict(String),

    /// Missing or malformed input, schema constraint violations.
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid credential.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed (wrong role or not the owner).
    #[error("{0}")]
    Forbidden(String),

    /// Persistent store failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Confirmation email could not be rendered or delivered.
    #[error("Notification error: {0}")]
    Notification(String),
}

impl VibeError {
    /// Shorthand for [`VibeError::NotFound`].
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Shorthand for [`VibeError::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Shorthand for [`VibeError::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Returns `true` when the caller caused the failure (4xx family).
    ///
    /// # Examples
    ///
    /// ```
    /// # use vibe_core::VibeError;
    /// assert!(VibeError::conflict("full").is_client_error());
    /// assert!(!VibeError::Storage("down".into()).is_client_error());
    /// ```
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Storage(_) | Self::Notification(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = VibeError::not_found("Event", "abc");
        assert_eq!(err.to_string(), "Event with id abc not found");
    }

    #[test]
    fn test_storage_is_server_side() {
        assert!(!VibeError::Storage("connection reset".to_string()).is_client_error());
        assert!(VibeError::Forbidden("nope".to_string()).is_client_error());
    }
}
