use rand::RngCore;

use crate::{db::Store, errors::AppError, models::oauth_token::OauthTokenDoc};

fn generate_link_token() -> String {
    let mut bytes = [0u8; 16]; // 128-bit
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes) // 32 hex chars
}

/// Returns the store's Telegram invite code, minting and persisting one the
/// first time. Idempotent: an existing code is returned unchanged with no
/// write. A collision with another store's code surfaces as a persistence
/// conflict from the unique index.
pub async fn ensure_link_token(
    store: &dyn Store,
    token: &OauthTokenDoc,
) -> Result<String, AppError> {
    if let Some(existing) = &token.telegram_link_token {
        return Ok(existing.clone());
    }

    let link_token = generate_link_token();
    store.set_link_token(token.id, &link_token).await?;
    Ok(link_token)
}
