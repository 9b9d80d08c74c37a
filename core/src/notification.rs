//! Reservation confirmation notifier seam.
//!
//! The reservation service hands a [`ConfirmationEmail`] to a
//! [`ReservationNotifier`] after a successful booking. Delivery is
//! best-effort: errors are logged by the caller and never reach the client.

use crate::error::Result;
use crate::types::{Event, Reservation, ReservationId, User};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;

/// Everything needed to render a confirmation message.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfirmationEmail {
    /// Recipient address
    pub to: String,
    /// Recipient display name
    pub name: String,
    /// Event title
    pub event_title: String,
    /// Event date
    pub event_date: DateTime<Utc>,
    /// Event start time as entered by the business
    pub event_time: String,
    /// Reservation identifier, encoded verbatim in the QR code
    pub reservation_id: ReservationId,
    /// Ticket count
    pub tickets: u32,
}

impl ConfirmationEmail {
    /// Build the message for a freshly booked reservation.
    #[must_use]
    pub fn new(user: &User, event: &Event, reservation: &Reservation) -> Self {
        Self {
            to: user.email.clone(),
            name: user.name.clone(),
            event_title: event.title.clone(),
            event_date: event.date,
            event_time: event.time.clone(),
            reservation_id: reservation.id,
            tickets: reservation.no_reservations,
        }
    }

    /// Subject line.
    #[must_use]
    pub fn subject(&self) -> String {
        format!("Your Reservation Confirmation for {}", self.event_title)
    }
}

/// Delivers reservation confirmations.
///
/// Returns a boxed future so the service can hold an
/// `Arc<dyn ReservationNotifier>` and move it onto a spawned task.
pub trait ReservationNotifier: Send + Sync {
    /// Render and deliver a confirmation.
    ///
    /// # Errors
    ///
    /// Returns `Notification` if rendering or delivery fails.
    fn send_confirmation(
        &self,
        email: ConfirmationEmail,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}
