use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use tracing::debug;

use crate::{
    dto::webhook::{ProductPayload, WebhookEvent},
    errors::AppError,
    services::dispatcher,
    state::AppState,
};

/// Salla webhook endpoint. Events are authenticated by the shared webhook
/// secret in the `Authorization` header; anything other than
/// `product.updated` is acknowledged and ignored.
pub async fn salla_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(event): Json<WebhookEvent>,
) -> Result<StatusCode, AppError> {
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if auth != state.cfg.webhook_secret {
        return Err(AppError::Unauthorized);
    }

    match event.event.as_str() {
        "product.updated" => {
            let product: ProductPayload = serde_json::from_value(event.data)
                .map_err(|e| AppError::Validation(format!("bad product payload: {e}")))?;
            dispatcher::handle_product_updated(
                state.store.as_ref(),
                &state.notifier,
                state.cfg.default_stock_threshold,
                event.merchant,
                &product,
            )
            .await?;
        }
        other => {
            debug!(event = other, merchant = event.merchant, "ignoring webhook event");
        }
    }

    Ok(StatusCode::OK)
}
