use tracing::{debug, warn};

use crate::{
    db::Store,
    dto::{telegram::TelegramUpdate, webhook::ProductPayload},
    errors::AppError,
    services::notifier::Notifier,
};

const LINKED_TEXT: &str = "✅ <b>Store linked successfully!</b>\n\
    You will receive low stock alerts here from now on.";
const INVALID_LINK_TEXT: &str = "❌ <b>Sorry, this link is invalid or has expired.</b>\n\
    Please try again from the account page.";
const WELCOME_TEXT: &str = "👋 <b>Welcome to the Salla stock alerts bot!</b>\n\n\
    To link your store, use the \"Connect with Telegram\" button on the account page.";

/// Reacts to a `product.updated` event: resolves the owning store, compares
/// the quantity against the merchant's threshold, and fans the alert out to
/// every linked channel plus the legacy email. An event for an unknown
/// merchant is dropped with a warning.
pub async fn handle_product_updated(
    store: &dyn Store,
    notifier: &Notifier,
    default_threshold: i64,
    merchant: i64,
    product: &ProductPayload,
) -> Result<(), AppError> {
    let Some(token) = store.find_token_by_merchant(merchant).await? else {
        warn!(merchant, "no store found for merchant, dropping event");
        return Ok(());
    };
    let Some(user) = store.find_user_by_id(token.user_id).await? else {
        warn!(merchant, "token record has no owning user, dropping event");
        return Ok(());
    };

    let threshold = user.stock_threshold.unwrap_or(default_threshold);
    debug!(
        product_id = ?product.id,
        product = %product.name,
        quantity = product.quantity,
        threshold,
        "checking stock level"
    );
    if product.quantity > threshold {
        return Ok(());
    }

    let message = format!(
        "⚠️ <b>Low Stock Alert</b>\n\nProduct: <b>{}</b>\nCurrent Quantity: <b>{}</b>\n\
         Threshold: <b>{}</b>\n\nPlease restock soon!",
        product.name, product.quantity, threshold
    );

    let channels = store.list_channels(token.id).await?;
    let mut chat_ids: Vec<String> = channels.iter().map(|c| c.chat_id.clone()).collect();
    // legacy single-recipient chat rides along unless a channel row already
    // carries the same id
    if let Some(legacy) = &user.telegram_chat_id {
        if !chat_ids.contains(legacy) {
            chat_ids.push(legacy.clone());
        }
    }

    if !chat_ids.is_empty() {
        notifier
            .broadcast_to_store(&chat_ids, &message, token.store_label())
            .await;
    }
    if let Some(alert_email) = &user.alert_email {
        notifier.send_email_alert(alert_email, &message).await;
    }
    Ok(())
}

/// Handles an inbound bot update. `/start <token>` binds the sender's chat
/// to the store owning that link token; a bare `/start` gets a welcome
/// notice. Non-command messages are ignored.
pub async fn handle_telegram_update(
    store: &dyn Store,
    notifier: &Notifier,
    update: &TelegramUpdate,
) -> Result<(), AppError> {
    let Some(message) = &update.message else {
        return Ok(());
    };
    let Some(text) = &message.text else {
        return Ok(());
    };
    if !text.starts_with("/start") {
        return Ok(());
    }

    let chat_id = message.chat.id.to_string();
    let mut parts = text.split_whitespace();
    parts.next(); // the command itself

    match parts.next() {
        Some(link_token) => match store.find_token_by_link_token(link_token).await? {
            Some(token) => {
                let label = message.from.as_ref().map(|f| f.first_name.clone());
                store.add_channel(token.id, &chat_id, label).await?;
                notifier.send_telegram_alert(&chat_id, LINKED_TEXT).await;
            }
            None => {
                notifier.send_telegram_alert(&chat_id, INVALID_LINK_TEXT).await;
            }
        },
        None => {
            notifier.send_telegram_alert(&chat_id, WELCOME_TEXT).await;
        }
    }
    Ok(())
}
