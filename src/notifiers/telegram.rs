use crate::app::ports::BotApi;
use crate::config::TelegramConfig;
use crate::infra::telegram_api::TelegramHttpApi;
use crate::notifiers::message::AlertMessage;
use crate::notifiers::Notifier;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, instrument};

pub struct TelegramNotifier {
    config: TelegramConfig,
    api: Option<Arc<dyn BotApi>>,
}

impl TelegramNotifier {
    pub fn from_config(config: TelegramConfig) -> Self {
        let api = match &config.bot_token {
            Some(token) if config.is_configured() => {
                match TelegramHttpApi::new(&config.api_base, token) {
                    Ok(api) => Some(Arc::new(api) as Arc<dyn BotApi>),
                    Err(e) => {
                        error!("Could not set up Telegram client: {}", e);
                        None
                    }
                }
            }
            _ => None,
        };
        Self { config, api }
    }

    pub fn with_api(config: TelegramConfig, api: Arc<dyn BotApi>) -> Self {
        Self {
            config,
            api: Some(api),
        }
    }
}

/// Show only the first and last few characters of a bot token.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 10 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..5].iter().collect();
    let tail: String = chars[chars.len() - 5..].iter().collect();
    format!("{}...{}", head, tail)
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    fn is_valid(&self) -> bool {
        self.config.is_configured() && self.api.is_some()
    }

    #[instrument(skip(self), fields(chats = self.config.chat_ids.len()))]
    async fn send_notification(
        &self,
        wind_speed: f64,
        wind_gust: Option<f64>,
        threshold: f64,
        location: &str,
    ) -> bool {
        if !self.config.is_configured() {
            error!("Telegram configuration is incomplete, notification not sent");
            error!("Missing: {}", self.config.missing_fields().join(", "));
            return false;
        }
        let Some(api) = &self.api else {
            error!("Telegram client could not be set up, notification not sent");
            return false;
        };

        let alert = AlertMessage::new(
            wind_speed,
            wind_gust,
            threshold,
            location,
            &self.config.website_url,
        );
        let text = alert.telegram_markdown();

        let mut success = true;
        for chat_id in &self.config.chat_ids {
            match api.send_message(chat_id, &text).await {
                Ok(()) => info!("Telegram notification sent to chat {}", chat_id),
                Err(e) => {
                    error!("Failed to send Telegram notification to chat {}: {}", chat_id, e);
                    success = false;
                }
            }
        }
        success
    }
}
