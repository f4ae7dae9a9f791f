use crate::app::ports::BotApi;
use crate::constants::TELEGRAM_TIMEOUT_SECS;
use crate::error::NotifyError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    description: Option<String>,
}

/// Telegram Bot API client for `sendMessage`.
pub struct TelegramHttpApi {
    client: reqwest::Client,
    api_base: String,
    bot_token: String,
}

impl TelegramHttpApi {
    pub fn new(api_base: &str, bot_token: &str) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(TELEGRAM_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            bot_token: bot_token.to_string(),
        })
    }
}

#[async_trait]
impl BotApi for TelegramHttpApi {
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), NotifyError> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);
        let form = [
            ("chat_id", chat_id),
            ("text", text),
            ("parse_mode", "Markdown"),
            ("disable_web_page_preview", "false"),
        ];
        // Never let the token-bearing URL reach the logs
        let resp = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| NotifyError::Http(e.without_url()))?;

        let status = resp.status();
        let body: SendMessageResponse = resp.json().await.map_err(|e| NotifyError::Api {
            message: format!("unexpected response (status {}): {}", status, e.without_url()),
        })?;

        if body.ok {
            Ok(())
        } else {
            Err(NotifyError::Api {
                message: body
                    .description
                    .unwrap_or_else(|| format!("request failed with status {}", status)),
            })
        }
    }
}
