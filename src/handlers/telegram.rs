use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use tracing::error;

use crate::{dto::telegram::TelegramUpdate, services::dispatcher, state::AppState};

/// Telegram bot webhook. Always acknowledges so the bot API does not retry
/// a poison update forever; processing failures are logged.
pub async fn telegram_webhook(
    State(state): State<Arc<AppState>>,
    Json(update): Json<TelegramUpdate>,
) -> StatusCode {
    if let Err(e) =
        dispatcher::handle_telegram_update(state.store.as_ref(), &state.notifier, &update).await
    {
        error!("telegram webhook error: {e}");
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    StatusCode::OK
}
