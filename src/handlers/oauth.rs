use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::{
    dto::account::OauthCallbackQuery, errors::AppError, models::user::NewUser, state::AppState,
};

/// OAuth callback: exchanges the code, then persists the user and the
/// (user, merchant) token pair. The browser-facing redirect flow lives in
/// front of this service.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OauthCallbackQuery>,
) -> Result<Json<Value>, AppError> {
    let grant = state.salla.exchange_authorization_code(&query.code).await?;
    let owner = state.salla.get_resource_owner(&grant.access_token).await?;

    let user_id = state
        .store
        .save_user(NewUser {
            salla_id: Some(owner.merchant.id),
            username: owner.name,
            email: owner.email,
        })
        .await?;
    state
        .store
        .save_oauth(
            user_id,
            owner.merchant.id,
            grant,
            owner.merchant.name,
            owner.merchant.avatar,
        )
        .await?;

    info!(merchant = owner.merchant.id, "store authorized");
    Ok(Json(json!({
        "status": "authorized",
        "merchant": owner.merchant.id,
    })))
}
