//! Mailer configuration.

use lettre::message::Mailbox;
use vibe_core::{Result, VibeError};

/// Default sender address.
pub const DEFAULT_FROM_EMAIL: &str = "no-reply@vibe.com";

/// Default sender display name.
pub const DEFAULT_FROM_NAME: &str = "Vibe";

/// SMTP login.
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpCredentials {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

impl std::fmt::Debug for SmtpCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Where confirmation emails go.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum MailTransport {
    /// Log the message instead of sending it.
    #[default]
    Console,
    /// Test relay such as Ethereal or Mailpit. Credentials switch on STARTTLS.
    Sandbox {
        /// Relay host
        host: String,
        /// Relay port
        port: u16,
        /// Optional login
        credentials: Option<SmtpCredentials>,
    },
    /// Real relay over implicit TLS.
    Production {
        /// Relay host
        host: String,
        /// Relay port
        port: u16,
        /// Login
        credentials: SmtpCredentials,
    },
}

impl MailTransport {
    /// Short name for logs.
    #[must_use]
    pub const fn mode(&self) -> &'static str {
        match self {
            Self::Console => "console",
            Self::Sandbox { .. } => "sandbox",
            Self::Production { .. } => "production",
        }
    }
}

/// Explicit mailer configuration handed to [`crate::notifier_from_config`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MailerConfig {
    /// Transport selection
    pub transport: MailTransport,
    /// Sender address
    pub from_email: String,
    /// Sender display name
    pub from_name: String,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            transport: MailTransport::Console,
            from_email: DEFAULT_FROM_EMAIL.to_string(),
            from_name: DEFAULT_FROM_NAME.to_string(),
        }
    }
}

impl MailerConfig {
    /// Configuration with the given transport and the default sender.
    #[must_use]
    pub fn new(transport: MailTransport) -> Self {
        Self {
            transport,
            ..Self::default()
        }
    }

    /// Override the sender.
    #[must_use]
    pub fn with_sender(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.from_name = name.into();
        self.from_email = email.into();
        self
    }

    /// The `From` mailbox.
    ///
    /// # Errors
    ///
    /// Returns `Notification` when the sender address does not parse.
    pub fn sender(&self) -> Result<Mailbox> {
        let address = self
            .from_email
            .parse()
            .map_err(|e| VibeError::Notification(format!("Invalid from address: {e}")))?;
        Ok(Mailbox::new(Some(self.from_name.clone()), address))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sender() {
        let sender = MailerConfig::default().sender().unwrap();
        assert_eq!(sender.to_string(), "Vibe <no-reply@vibe.com>");
    }

    #[test]
    fn test_invalid_sender_is_rejected() {
        let config = MailerConfig::default().with_sender("Vibe", "nope");
        assert!(matches!(config.sender(), Err(VibeError::Notification(_))));
    }

    #[test]
    fn test_credentials_are_redacted_in_debug() {
        let transport = MailTransport::Production {
            host: "smtp.gmail.com".to_string(),
            port: 465,
            credentials: SmtpCredentials {
                username: "vibe@gmail.com".to_string(),
                password: "app-secret".to_string(),
            },
        };
        let printed = format!("{transport:?}");
        assert!(!printed.contains("app-secret"));
        assert_eq!(transport.mode(), "production");
    }
}
