use serde::{Deserialize, Serialize};

use crate::models::{oauth_token::StorePublic, store_telegram::ChannelPublic};

/// Omitted fields are left unchanged; sending `""` for a chat id or alert
/// email clears it.
#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    pub stock_threshold: Option<i64>,
    pub telegram_chat_id: Option<String>,
    pub alert_email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StoreSelector {
    pub merchant: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub link_token: String,
    pub bot_username: Option<String>,
    pub connect_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UnlinkRequest {
    pub merchant: Option<i64>,
    pub chat_id: String,
}

#[derive(Debug, Serialize)]
pub struct UnlinkResponse {
    pub removed: u64,
}

#[derive(Debug, Serialize)]
pub struct ChannelsResponse {
    pub store: StorePublic,
    pub channels: Vec<ChannelPublic>,
}

#[derive(Debug, Deserialize)]
pub struct OauthCallbackQuery {
    pub code: String,
}
