//! Notification gateway
//!
//! Sends the password-recovery email. Delivery is fire-and-forget from the
//! endpoint's perspective: callers log and swallow failures, the client sees
//! success once the account lookup succeeded.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use roomer_core::{MailConfig, RoomerError, Result};

/// Gateway for outbound notification email.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send the password-recovery email carrying the reset link.
    async fn send_password_reset(&self, to_email: &str, reset_link: &str) -> Result<()>;
}

/// SMTP implementation over the configured relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| RoomerError::Upstream(format!("SMTP relay setup failed: {e}")))?
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .build();

        let from = config
            .from_address
            .parse()
            .map_err(|e| RoomerError::Upstream(format!("Invalid from address: {e}")))?;

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_password_reset(&self, to_email: &str, reset_link: &str) -> Result<()> {
        let to = to_email
            .parse()
            .map_err(|e| RoomerError::Upstream(format!("Invalid recipient address: {e}")))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject("Change your password on Roomer")
            .body(format!(
                "Please, click on the following link to change your password: {reset_link}"
            ))
            .map_err(|e| RoomerError::Upstream(format!("Failed to build email: {e}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| RoomerError::Upstream(format!("Failed to send email: {e}")))?;

        Ok(())
    }
}

/// Recording fake for tests.
#[cfg(any(test, feature = "test-utils"))]
pub struct RecordingMailer {
    sent: std::sync::Mutex<Vec<(String, String)>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl RecordingMailer {
    pub fn new() -> Self {
        Self {
            sent: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// (recipient, reset link) pairs in send order.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Default for RecordingMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_password_reset(&self, to_email: &str, reset_link: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((to_email.to_string(), reset_link.to_string()));
        Ok(())
    }
}
