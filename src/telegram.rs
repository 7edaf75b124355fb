use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::{config::Config, errors::AppError};

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    description: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotInfo {
    pub username: String,
}

#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    api_base: String,
    bot_token: Option<String>,
}

impl TelegramClient {
    pub fn new(cfg: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: cfg.telegram_api_base.clone(),
            bot_token: cfg.telegram_bot_token.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.bot_token.is_some()
    }

    /// Sends one HTML-formatted message. An absent bot token is a
    /// configuration gap: the send is skipped with a warning, not failed.
    /// A non-`ok` API response is a delivery failure.
    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), AppError> {
        let Some(token) = &self.bot_token else {
            warn!("telegram bot token missing, skipping alert");
            return Ok(());
        };

        let url = format!("{}/bot{}/sendMessage", self.api_base, token);
        let resp = self
            .http
            .post(url)
            .json(&json!({
                "chat_id": chat_id,
                "text": text,
                "parse_mode": "HTML",
            }))
            .send()
            .await?;

        let body: ApiResponse<serde_json::Value> = resp.json().await?;
        if !body.ok {
            return Err(AppError::Upstream(format!(
                "telegram sendMessage rejected (chat {chat_id}): {}",
                body.description.unwrap_or_default()
            )));
        }
        Ok(())
    }

    /// Fetches the bot profile, used to build the `t.me` deep link. Any
    /// failure here degrades to `None`: the caller still has a usable link
    /// token, it just cannot render the deep link.
    pub async fn get_me(&self) -> Option<BotInfo> {
        let Some(token) = &self.bot_token else {
            warn!("telegram bot token missing, cannot resolve bot info");
            return None;
        };

        let url = format!("{}/bot{}/getMe", self.api_base, token);
        let resp = match self.http.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("telegram getMe unreachable: {e}");
                return None;
            }
        };
        let body: ApiResponse<BotInfo> = match resp.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!("telegram getMe returned an unreadable body: {e}");
                return None;
            }
        };
        if !body.ok {
            warn!(
                "telegram getMe rejected: {}",
                body.description.unwrap_or_default()
            );
            return None;
        }
        body.result
    }
}
