//! Email service for sending transactional emails.
//!
//! Uses `lettre` for SMTP transport. With delivery disabled the composed
//! message is logged instead, which is what local development runs with.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor, message::header::ContentType,
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;
use tracing::info;

use crate::config::EmailConfig;

/// Email service errors.
#[derive(Debug, Error)]
pub enum EmailError {
    /// Failed to build email message.
    #[error("Failed to build email: {0}")]
    BuildError(String),
    /// Failed to send email.
    #[error("Failed to send email: {0}")]
    SendError(String),
    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Email service for sending transactional emails.
#[derive(Debug, Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    /// Creates a new email service.
    #[must_use]
    pub const fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Creates an SMTP transport.
    fn create_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
        let creds = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        );

        Ok(
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)
                .map_err(|e| EmailError::SendError(e.to_string()))?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build(),
        )
    }

    /// Builds the link a user follows to confirm their address.
    #[must_use]
    pub fn confirmation_url(&self, token: &str) -> String {
        format!(
            "{}/registration/confirmation?token={token}",
            self.config.public_url.trim_end_matches('/')
        )
    }

    /// Sends the registration confirmation email.
    ///
    /// # Errors
    ///
    /// Returns an error if the email cannot be sent.
    pub async fn send_confirmation_email(
        &self,
        to_email: &str,
        to_name: &str,
        token: &str,
    ) -> Result<(), EmailError> {
        let confirmation_url = self.confirmation_url(token);

        let subject = "Подтверждение регистрации - Bookcrossing";
        let body = format!(
            r"Здравствуйте, {to_name}!

Для завершения регистрации перейдите по ссылке:

{confirmation_url}

Ссылка действительна 24 часа.

Если вы не регистрировались в Bookcrossing, просто проигнорируйте это письмо."
        );

        self.send_email(to_email, subject, &body).await
    }

    /// Sends a generic email.
    ///
    /// # Errors
    ///
    /// Returns an error if the email cannot be sent.
    pub async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), EmailError> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        let email = Message::builder()
            .from(
                from.parse()
                    .map_err(|e| EmailError::InvalidAddress(format!("{e}")))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| EmailError::InvalidAddress(format!("{e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| EmailError::BuildError(e.to_string()))?;

        if !self.config.enabled {
            info!(to = %to_email, subject = %subject, body = %body, "Email delivery disabled, message logged");
            return Ok(());
        }

        let transport = self.create_transport()?;
        transport
            .send(email)
            .await
            .map_err(|e| EmailError::SendError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_url() {
        let service = EmailService::new(EmailConfig {
            public_url: "https://books.example.org/".to_string(),
            ..EmailConfig::default()
        });
        assert_eq!(
            service.confirmation_url("abc"),
            "https://books.example.org/registration/confirmation?token=abc"
        );
    }

    #[tokio::test]
    async fn test_disabled_delivery_succeeds() {
        let service = EmailService::new(EmailConfig::default());
        service
            .send_confirmation_email("al@yandex.ru", "Alex", "token")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_invalid_recipient() {
        let service = EmailService::new(EmailConfig::default());
        let result = service.send_email("not-an-address", "s", "b").await;
        assert!(matches!(result, Err(EmailError::InvalidAddress(_))));
    }
}
