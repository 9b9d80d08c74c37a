//! Console delivery for development.

use crate::qr;
use std::future::Future;
use std::pin::Pin;
use tracing::info;
use vibe_core::{ConfirmationEmail, ReservationNotifier, Result};

/// Logs confirmations instead of sending them.
///
/// The QR code is still rendered so that encoding problems surface locally.
#[derive(Clone, Debug, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    /// Create a console notifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ReservationNotifier for ConsoleNotifier {
    fn send_confirmation(
        &self,
        email: ConfirmationEmail,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let png = qr::png(&email.reservation_id.to_string())?;
            info!(
                to = %email.to,
                subject = %email.subject(),
                event_date = %email.event_date.format("%Y-%m-%d"),
                event_time = %email.event_time,
                tickets = email.tickets,
                reservation_id = %email.reservation_id,
                qr_bytes = png.len(),
                "📧 Reservation confirmation (console mode)"
            );
            Ok(())
        })
    }
}
