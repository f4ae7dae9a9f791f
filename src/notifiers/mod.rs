pub mod email;
pub mod message;
pub mod telegram;

use crate::config::Settings;
use async_trait::async_trait;
use email::EmailNotifier;
use telegram::TelegramNotifier;
use tracing::warn;

/// A delivery channel for wind alerts.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;

    /// True when every setting the channel needs is present.
    fn is_valid(&self) -> bool;

    /// Deliver one alert to every configured recipient. Returns `true` only
    /// when all deliveries succeeded; failures are logged, never raised.
    async fn send_notification(
        &self,
        wind_speed: f64,
        wind_gust: Option<f64>,
        threshold: f64,
        location: &str,
    ) -> bool;
}

/// Build the notifiers selected by `NOTIFICATION_METHOD`, keeping only the
/// ones that are fully configured.
pub fn build_notifiers(settings: &Settings) -> Vec<Box<dyn Notifier>> {
    let method = settings.notification_method;
    let mut notifiers: Vec<Box<dyn Notifier>> = Vec::new();

    if method.uses_email() {
        let notifier = EmailNotifier::from_config(settings.email.clone());
        if notifier.is_valid() {
            notifiers.push(Box::new(notifier));
        } else {
            warn!(
                "Email notifier selected but not configured (missing: {})",
                settings.email.missing_fields().join(", ")
            );
        }
    }

    if method.uses_telegram() {
        let notifier = TelegramNotifier::from_config(settings.telegram.clone());
        if notifier.is_valid() {
            notifiers.push(Box::new(notifier));
        } else {
            warn!(
                "Telegram notifier selected but not configured (missing: {})",
                settings.telegram.missing_fields().join(", ")
            );
        }
    }

    notifiers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::{BotApi, MailTransport};
    use crate::config::{EmailConfig, TelegramConfig};
    use crate::error::NotifyError;
    use std::collections::HashMap;
    use std::sync::Arc;

    struct MockMailTransport {
        pub sent_to: Arc<tokio::sync::Mutex<Vec<String>>>,
        fail_for: Option<String>,
    }

    impl MockMailTransport {
        fn new(fail_for: Option<&str>) -> Self {
            Self {
                sent_to: Arc::new(tokio::sync::Mutex::new(Vec::new())),
                fail_for: fail_for.map(str::to_string),
            }
        }
    }

    #[async_trait]
    impl MailTransport for MockMailTransport {
        async fn send(&self, message: lettre::Message) -> Result<(), NotifyError> {
            let to = message.envelope().to()[0].to_string();
            self.sent_to.lock().await.push(to.clone());
            if self.fail_for.as_deref() == Some(to.as_str()) {
                return Err(NotifyError::Smtp("550 mailbox unavailable".into()));
            }
            Ok(())
        }
    }

    struct MockBotApi {
        pub messages: Arc<tokio::sync::Mutex<Vec<(String, String)>>>,
    }

    #[async_trait]
    impl BotApi for MockBotApi {
        async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), NotifyError> {
            self.messages
                .lock()
                .await
                .push((chat_id.to_string(), text.to_string()));
            if chat_id == "bad" {
                return Err(NotifyError::Api {
                    message: "Bad Request: chat not found".into(),
                });
            }
            Ok(())
        }
    }

    fn email_config(recipients: &[&str]) -> EmailConfig {
        EmailConfig {
            smtp_server: "smtp.example.com".into(),
            smtp_port: 587,
            username: Some("bot@example.com".into()),
            password: Some("secret".into()),
            sender: Some("bot@example.com".into()),
            recipients: recipients.iter().map(|r| r.to_string()).collect(),
            website_url: "https://example.org/port".into(),
        }
    }

    fn telegram_config(chats: &[&str]) -> TelegramConfig {
        TelegramConfig {
            bot_token: Some("123456789:ABCDEFGHIJ".into()),
            chat_ids: chats.iter().map(|c| c.to_string()).collect(),
            website_url: "https://example.org/port".into(),
            api_base: "https://api.telegram.org".into(),
        }
    }

    #[tokio::test]
    async fn test_email_partial_failure_still_tries_everyone() {
        let transport = Arc::new(MockMailTransport::new(Some("b@example.com")));
        let notifier = EmailNotifier::with_transport(
            email_config(&["a@example.com", "b@example.com", "c@example.com"]),
            transport.clone(),
        );

        let ok = notifier
            .send_notification(18.5, Some(24.0), 15.0, "Saint-Raphaël port")
            .await;

        assert!(!ok);
        let sent = transport.sent_to.lock().await;
        assert_eq!(*sent, vec!["a@example.com", "b@example.com", "c@example.com"]);
    }

    #[tokio::test]
    async fn test_email_all_delivered() {
        let transport = Arc::new(MockMailTransport::new(None));
        let notifier = EmailNotifier::with_transport(
            email_config(&["a@example.com", "b@example.com"]),
            transport.clone(),
        );
        assert!(notifier.send_notification(18.5, None, 15.0, "port").await);
        assert_eq!(transport.sent_to.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_email_config_sends_nothing() {
        let transport = Arc::new(MockMailTransport::new(None));
        let mut config = email_config(&["a@example.com"]);
        config.password = None;
        let notifier = EmailNotifier::with_transport(config, transport.clone());

        assert!(!notifier.is_valid());
        assert!(!notifier.send_notification(18.5, None, 15.0, "port").await);
        assert!(transport.sent_to.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_telegram_sends_one_message_per_chat() {
        let api = Arc::new(MockBotApi {
            messages: Arc::new(tokio::sync::Mutex::new(Vec::new())),
        });
        let notifier = TelegramNotifier::with_api(telegram_config(&["42", "43"]), api.clone());

        assert!(notifier.send_notification(18.5, None, 15.0, "Saint-Raphaël port").await);
        let messages = api.messages.lock().await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].0, "42");
        assert!(messages[0].1.contains("*High Wind Alert*"));
        assert!(messages[0].1.contains("18.5 knots"));
    }

    #[tokio::test]
    async fn test_telegram_failure_for_one_chat() {
        let api = Arc::new(MockBotApi {
            messages: Arc::new(tokio::sync::Mutex::new(Vec::new())),
        });
        let notifier = TelegramNotifier::with_api(telegram_config(&["bad", "43"]), api.clone());

        assert!(!notifier.send_notification(18.5, None, 15.0, "port").await);
        assert_eq!(api.messages.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_telegram_config_sends_nothing() {
        let api = Arc::new(MockBotApi {
            messages: Arc::new(tokio::sync::Mutex::new(Vec::new())),
        });
        let mut config = telegram_config(&["42"]);
        config.bot_token = None;
        let notifier = TelegramNotifier::with_api(config, api.clone());

        assert!(!notifier.is_valid());
        assert!(!notifier.send_notification(18.5, None, 15.0, "port").await);
        assert!(api.messages.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_telegram_without_chats_sends_nothing() {
        let api = Arc::new(MockBotApi {
            messages: Arc::new(tokio::sync::Mutex::new(Vec::new())),
        });
        let notifier = TelegramNotifier::with_api(telegram_config(&[]), api.clone());

        assert!(!notifier.is_valid());
        assert!(!notifier.send_notification(18.5, None, 15.0, "port").await);
        assert!(api.messages.lock().await.is_empty());
    }

    #[test]
    fn test_build_notifiers_skips_unconfigured() {
        let map: HashMap<&str, &str> = [
            ("NOTIFICATION_METHOD", "both"),
            ("TELEGRAM_BOT_TOKEN", "123456789:ABCDEFGHIJ"),
            ("TELEGRAM_CHAT_ID", "42"),
        ]
        .into_iter()
        .collect();
        let settings = Settings::from_lookup(|k| map.get(k).map(|v| v.to_string())).unwrap();

        let notifiers = build_notifiers(&settings);
        assert_eq!(notifiers.len(), 1);
        assert_eq!(notifiers[0].name(), "telegram");
    }

    #[test]
    fn test_build_notifiers_none_configured() {
        let settings = Settings::from_lookup(|_| None).unwrap();
        assert!(build_notifiers(&settings).is_empty());
    }
}
