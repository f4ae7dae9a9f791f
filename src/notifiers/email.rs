use crate::app::ports::MailTransport;
use crate::config::EmailConfig;
use crate::error::NotifyError;
use crate::infra::smtp::SmtpMailer;
use crate::notifiers::message::AlertMessage;
use crate::notifiers::Notifier;
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::Message;
use std::sync::Arc;
use tracing::{error, info, instrument};

pub struct EmailNotifier {
    config: EmailConfig,
    transport: Option<Arc<dyn MailTransport>>,
}

impl EmailNotifier {
    /// Build with a real SMTP transport when the configuration allows one.
    pub fn from_config(config: EmailConfig) -> Self {
        let transport = match (&config.username, &config.password) {
            (Some(username), Some(password)) if config.is_configured() => {
                match SmtpMailer::new(
                    &config.smtp_server,
                    config.smtp_port,
                    username.clone(),
                    password.clone(),
                ) {
                    Ok(mailer) => Some(Arc::new(mailer) as Arc<dyn MailTransport>),
                    Err(e) => {
                        error!("Could not set up SMTP transport: {}", e);
                        None
                    }
                }
            }
            _ => None,
        };
        Self { config, transport }
    }

    pub fn with_transport(config: EmailConfig, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            config,
            transport: Some(transport),
        }
    }

    fn log_incomplete(&self) {
        error!("Email configuration is incomplete, notification not sent");
        error!("SMTP Server: {}:{}", self.config.smtp_server, self.config.smtp_port);
        error!("Missing: {}", self.config.missing_fields().join(", "));
    }

    fn build_message(&self, alert: &AlertMessage, recipient: &str) -> Result<Message, NotifyError> {
        let sender = self.config.sender.as_deref().unwrap_or_default();
        let from: Mailbox = sender.parse().map_err(|e: lettre::address::AddressError| {
            NotifyError::Address {
                address: sender.to_string(),
                message: e.to_string(),
            }
        })?;
        let to: Mailbox = recipient.parse().map_err(|e: lettre::address::AddressError| {
            NotifyError::Address {
                address: recipient.to_string(),
                message: e.to_string(),
            }
        })?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(alert.subject())
            .multipart(MultiPart::alternative_plain_html(alert.text(), alert.html()))
            .map_err(|e| NotifyError::Message(e.to_string()))
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &'static str {
        "email"
    }

    fn is_valid(&self) -> bool {
        self.config.is_configured() && self.transport.is_some()
    }

    #[instrument(skip(self), fields(recipients = self.config.recipients.len()))]
    async fn send_notification(
        &self,
        wind_speed: f64,
        wind_gust: Option<f64>,
        threshold: f64,
        location: &str,
    ) -> bool {
        if !self.config.is_configured() {
            self.log_incomplete();
            return false;
        }
        let Some(transport) = &self.transport else {
            error!(
                "SMTP transport for {}:{} could not be set up, notification not sent",
                self.config.smtp_server, self.config.smtp_port
            );
            return false;
        };

        let alert = AlertMessage::new(
            wind_speed,
            wind_gust,
            threshold,
            location,
            &self.config.website_url,
        );

        let mut success = true;
        for recipient in &self.config.recipients {
            info!("Sending email to {}...", recipient);
            let result = match self.build_message(&alert, recipient) {
                Ok(message) => transport.send(message).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(()) => info!("Email notification sent to {}", recipient),
                Err(e) => {
                    error!("Failed to send email notification to {}: {}", recipient, e);
                    if e.to_string().to_lowercase().contains("auth") {
                        error!("This appears to be an authentication issue. Check SMTP_USERNAME and SMTP_PASSWORD (Gmail with 2FA needs an App Password).");
                    }
                    success = false;
                }
            }
        }
        success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(recipients: &[&str]) -> EmailConfig {
        EmailConfig {
            smtp_server: "smtp.example.com".into(),
            smtp_port: 587,
            username: Some("bot@example.com".into()),
            password: Some("hunter2".into()),
            sender: Some("bot@example.com".into()),
            recipients: recipients.iter().map(|r| r.to_string()).collect(),
            website_url: "https://example.org/port".into(),
        }
    }

    #[test]
    fn test_message_has_both_parts() {
        let notifier = EmailNotifier::from_config(config(&["crew@example.com"]));
        let alert = AlertMessage::new(18.5, None, 15.0, "Saint-Raphaël port", "https://x");
        let message = notifier.build_message(&alert, "crew@example.com").unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("text/plain"));
        assert!(raw.contains("text/html"));
        assert!(raw.contains("To: crew@example.com"));
    }

    #[test]
    fn test_bad_recipient_address() {
        let notifier = EmailNotifier::from_config(config(&["not-an-address"]));
        let alert = AlertMessage::new(18.5, None, 15.0, "x", "https://x");
        let err = notifier.build_message(&alert, "not-an-address").unwrap_err();
        assert!(matches!(err, NotifyError::Address { .. }));
    }

    #[tokio::test]
    async fn test_complete_config_without_transport_sends_nothing() {
        let notifier = EmailNotifier {
            config: config(&["crew@example.com"]),
            transport: None,
        };
        assert!(notifier.config.missing_fields().is_empty());
        assert!(!notifier.is_valid());
        assert!(!notifier.send_notification(18.5, None, 15.0, "port").await);
    }

    #[test]
    fn test_from_config_without_credentials_is_invalid() {
        let mut cfg = config(&["crew@example.com"]);
        cfg.password = None;
        let notifier = EmailNotifier::from_config(cfg);
        assert!(!notifier.is_valid());
    }
}
