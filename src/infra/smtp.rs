use crate::app::ports::MailTransport;
use crate::error::NotifyError;
use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

/// SMTP submission with authentication. Port 465 uses implicit TLS, every
/// other port STARTTLS. Without connection pooling each message opens its
/// own session.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(
        server: &str,
        port: u16,
        username: String,
        password: String,
    ) -> Result<Self, NotifyError> {
        let builder = if port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(server)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(server)
        }
        .map_err(|e| NotifyError::Smtp(e.to_string()))?;

        let transport = builder
            .port(port)
            .credentials(Credentials::new(username, password))
            .build();
        Ok(Self { transport })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, message: Message) -> Result<(), NotifyError> {
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Smtp(e.to_string()))?;
        debug!("SMTP response code {}", response.code());
        Ok(())
    }
}
