use chrono::Utc;
use tracing::info;

use crate::{db::Store, errors::AppError, models::oauth_token::OauthTokenDoc, salla::TokenRefresher};

/// Tokens are treated as expired this many seconds before their real expiry.
pub const REFRESH_BUFFER_SECS: i64 = 300;

/// Picks the token record for the named merchant, or the oldest-connected
/// store when no merchant is given. `tokens` must already be sorted by
/// creation time ascending (the `Store` contract).
pub fn select_token(tokens: &[OauthTokenDoc], merchant: Option<i64>) -> Option<&OauthTokenDoc> {
    match merchant {
        Some(m) => tokens.iter().find(|t| t.merchant == m),
        None => tokens.first(),
    }
}

/// Returns a currently-valid access token for the user's store, refreshing
/// through the provider and persisting the new pair when the stored one is
/// expired or inside the buffer window. At most one refresh call and one
/// write per invocation; a fresh token costs neither.
pub async fn get_valid_access_token(
    store: &dyn Store,
    refresher: &dyn TokenRefresher,
    email: &str,
    merchant: Option<i64>,
) -> Result<String, AppError> {
    let user = store
        .find_user_by_email(email)
        .await?
        .ok_or(AppError::NoTokensFound)?;
    let tokens = store.find_tokens_for_user(user.id).await?;
    let token = select_token(&tokens, merchant).ok_or(AppError::NoTokensFound)?;

    let expiry_time =
        token.updated_at.timestamp_millis() / 1000 + token.expires_in - REFRESH_BUFFER_SECS;
    if Utc::now().timestamp() < expiry_time {
        return Ok(token.access_token.clone());
    }

    info!(merchant = token.merchant, "access token expired, requesting refresh");
    let grant = refresher
        .refresh_access_token(&token.refresh_token)
        .await
        .map_err(|e| match e {
            e @ AppError::TokenRefreshFailed(_) => e,
            other => AppError::TokenRefreshFailed(other.to_string()),
        })?;

    let updated = store
        .save_oauth(user.id, token.merchant, grant, None, None)
        .await?;
    Ok(updated.access_token)
}
