//! # Vibe Notify
//!
//! Reservation confirmation emails.
//!
//! Every confirmation is an HTML message with the reservation's QR code
//! attached inline (`cid:qrcode`). The QR payload is the reservation id and
//! nothing else, so check-in staff can scan it straight into a lookup.
//!
//! Delivery is chosen by an explicit [`MailerConfig`]:
//!
//! - [`MailTransport::Console`] logs the message (development default)
//! - [`MailTransport::Sandbox`] relays to a test inbox
//! - [`MailTransport::Production`] relays over TLS
//!
//! # Example
//!
//! ```
//! use vibe_notify::{MailerConfig, notifier_from_config};
//!
//! let notifier = notifier_from_config(&MailerConfig::default())?;
//! # Ok::<(), vibe_core::VibeError>(())
//! ```

pub mod config;
pub mod console;
pub mod qr;
pub mod render;
pub mod smtp;

pub use config::{MailTransport, MailerConfig, SmtpCredentials};
pub use console::ConsoleNotifier;
pub use smtp::SmtpNotifier;

use std::sync::Arc;
use tracing::info;
use vibe_core::{ReservationNotifier, Result};

/// Build the notifier selected by `config`.
///
/// # Errors
///
/// Returns `Notification` when an SMTP transport cannot be constructed.
pub fn notifier_from_config(config: &MailerConfig) -> Result<Arc<dyn ReservationNotifier>> {
    info!(mode = config.transport.mode(), from = %config.from_email, "mailer configured");
    let notifier: Arc<dyn ReservationNotifier> = match config.transport {
        MailTransport::Console => Arc::new(ConsoleNotifier::new()),
        MailTransport::Sandbox { .. } | MailTransport::Production { .. } => {
            Arc::new(SmtpNotifier::new(config)?)
        }
    };
    Ok(notifier)
}
