//! SMTP delivery using Lettre's async transport.

use crate::config::{MailTransport, MailerConfig, SmtpCredentials};
use crate::render;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use std::future::Future;
use std::pin::Pin;
use tracing::debug;
use vibe_core::{ConfirmationEmail, ReservationNotifier, Result, VibeError};

/// Sends confirmations through an SMTP relay.
///
/// The transport is built once; Lettre pools connections internally.
#[derive(Clone)]
pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl std::fmt::Debug for SmtpNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpNotifier")
            .field("from", &self.from.to_string())
            .finish_non_exhaustive()
    }
}

fn credentials(login: &SmtpCredentials) -> Credentials {
    Credentials::new(login.username.clone(), login.password.clone())
}

impl SmtpNotifier {
    /// Build a notifier for a `Sandbox` or `Production` configuration.
    ///
    /// # Errors
    ///
    /// Returns `Notification` for a `Console` configuration, a bad sender,
    /// or a relay host that cannot be resolved into TLS parameters.
    pub fn new(config: &MailerConfig) -> Result<Self> {
        let mailer = match &config.transport {
            MailTransport::Console => {
                return Err(VibeError::Notification(
                    "console transport has no SMTP relay".to_string(),
                ));
            }
            MailTransport::Sandbox {
                host,
                port,
                credentials: Some(login),
            } => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| VibeError::Notification(format!("SMTP relay error: {e}")))?
                .port(*port)
                .credentials(credentials(login))
                .build(),
            MailTransport::Sandbox {
                host,
                port,
                credentials: None,
            } => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
                .port(*port)
                .build(),
            MailTransport::Production {
                host,
                port,
                credentials: login,
            } => AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                .map_err(|e| VibeError::Notification(format!("SMTP relay error: {e}")))?
                .port(*port)
                .credentials(credentials(login))
                .build(),
        };

        Ok(Self {
            mailer,
            from: config.sender()?,
        })
    }
}

impl ReservationNotifier for SmtpNotifier {
    fn send_confirmation(
        &self,
        email: ConfirmationEmail,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let message = render::message(&email, &self.from)?;
            let response = self
                .mailer
                .send(message)
                .await
                .map_err(|e| VibeError::Notification(format!("Failed to send email: {e}")))?;
            debug!(
                reservation_id = %email.reservation_id,
                code = %response.code(),
                "confirmation accepted by relay"
            );
            Ok(())
        })
    }
}
