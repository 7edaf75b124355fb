use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{
    handlers::{account, api, oauth, telegram, webhook},
    state::AppState,
};

pub fn app_router(state: Arc<AppState>) -> Router {
    let account = Router::new()
        .route(
            "/settings",
            get(account::get_settings).post(account::update_settings),
        )
        .route("/telegram/link", post(account::telegram_link))
        .route("/telegram/channels", get(account::list_channels))
        .route("/telegram/unlink", post(account::unlink_channel))
        .route("/orders", get(account::orders))
        .route("/customers", get(account::customers));

    Router::new()
        .route("/health", get(api::health))
        .route("/webhook", post(webhook::salla_webhook))
        .route("/telegram/webhook", post(telegram::telegram_webhook))
        .route("/oauth/callback", get(oauth::callback))
        .nest("/account", account)
        .with_state(state)
}
