use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Query, State},
    http::request::Parts,
    Json,
};
use serde_json::{json, Value};

use crate::{
    dto::account::{
        ChannelsResponse, LinkResponse, StoreSelector, UnlinkRequest, UnlinkResponse,
        UpdateSettingsRequest,
    },
    errors::AppError,
    models::{
        oauth_token::{OauthTokenDoc, StorePublic},
        user::{UserPublic, UserSettings},
    },
    services::{linking, tokens},
    state::AppState,
};

pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Identity of the signed-in merchant, injected by the fronting session
/// layer.
#[derive(Debug, Clone)]
pub struct UserEmail(pub String);

impl<S> FromRequestParts<S> for UserEmail
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let email = parts
            .headers
            .get(USER_EMAIL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_lowercase())
            .filter(|v| !v.is_empty())
            .ok_or(AppError::Unauthorized)?;
        Ok(Self(email))
    }
}

async fn select_store(
    state: &AppState,
    email: &str,
    merchant: Option<i64>,
) -> Result<OauthTokenDoc, AppError> {
    let user = state
        .store
        .find_user_by_email(email)
        .await?
        .ok_or(AppError::NoTokensFound)?;
    let stores = state.store.find_tokens_for_user(user.id).await?;
    tokens::select_token(&stores, merchant)
        .cloned()
        .ok_or(AppError::NoTokensFound)
}

pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    UserEmail(email): UserEmail,
) -> Result<Json<UserPublic>, AppError> {
    let user = state
        .store
        .find_user_by_email(&email)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(user.into()))
}

pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    UserEmail(email): UserEmail,
    Json(req): Json<UpdateSettingsRequest>,
) -> Result<Json<Value>, AppError> {
    if let Some(threshold) = req.stock_threshold {
        if threshold < 0 {
            return Err(AppError::Validation("stock_threshold must be >= 0".into()));
        }
    }

    state
        .store
        .update_user_settings(
            &email,
            UserSettings {
                stock_threshold: req.stock_threshold,
                telegram_chat_id: req.telegram_chat_id,
                alert_email: req.alert_email,
            },
        )
        .await?;
    Ok(Json(json!({ "status": "ok" })))
}

/// Ensures the store has a linking token and hands back everything the UI
/// needs to render the "Connect with Telegram" button. The body is optional;
/// without one the default store is linked.
pub async fn telegram_link(
    State(state): State<Arc<AppState>>,
    UserEmail(email): UserEmail,
    req: Option<Json<StoreSelector>>,
) -> Result<Json<LinkResponse>, AppError> {
    let req = req.map(|Json(r)| r).unwrap_or_default();
    let store = select_store(&state, &email, req.merchant).await?;
    let link_token = linking::ensure_link_token(state.store.as_ref(), &store).await?;

    let bot_username = state.notifier.telegram().get_me().await.map(|b| b.username);
    let connect_url = bot_username
        .as_ref()
        .map(|u| format!("https://t.me/{u}?start={link_token}"));

    Ok(Json(LinkResponse {
        link_token,
        bot_username,
        connect_url,
    }))
}

pub async fn list_channels(
    State(state): State<Arc<AppState>>,
    UserEmail(email): UserEmail,
    Query(query): Query<StoreSelector>,
) -> Result<Json<ChannelsResponse>, AppError> {
    let store = select_store(&state, &email, query.merchant).await?;
    let channels = state.store.list_channels(store.id).await?;

    Ok(Json(ChannelsResponse {
        store: StorePublic::from(&store),
        channels: channels.iter().map(Into::into).collect(),
    }))
}

pub async fn unlink_channel(
    State(state): State<Arc<AppState>>,
    UserEmail(email): UserEmail,
    Json(req): Json<UnlinkRequest>,
) -> Result<Json<UnlinkResponse>, AppError> {
    let store = select_store(&state, &email, req.merchant).await?;
    let removed = state.store.remove_channel(store.id, &req.chat_id).await?;
    Ok(Json(UnlinkResponse { removed }))
}

/// Proxies the store's orders through a just-in-time refreshed access
/// token.
pub async fn orders(
    State(state): State<Arc<AppState>>,
    UserEmail(email): UserEmail,
    Query(query): Query<StoreSelector>,
) -> Result<Json<Value>, AppError> {
    let access_token = tokens::get_valid_access_token(
        state.store.as_ref(),
        state.salla.as_ref(),
        &email,
        query.merchant,
    )
    .await?;
    let orders = state.salla.get_all_orders(&access_token).await?;
    Ok(Json(orders))
}

pub async fn customers(
    State(state): State<Arc<AppState>>,
    UserEmail(email): UserEmail,
    Query(query): Query<StoreSelector>,
) -> Result<Json<Value>, AppError> {
    let access_token = tokens::get_valid_access_token(
        state.store.as_ref(),
        state.salla.as_ref(),
        &email,
        query.merchant,
    )
    .await?;
    let customers = state.salla.get_all_customers(&access_token).await?;
    Ok(Json(customers))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::{
        db::{memory::MemoryStore, Store},
        models::{oauth_token::OauthTokenDoc, user::UserDoc},
        routes::app_router,
        services::notifier::tests::test_config,
        state::tests::test_state,
    };

    fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        let user_id = ObjectId::new();
        store.seed_user(UserDoc {
            id: user_id,
            salla_id: Some(1),
            username: "merchant".into(),
            email: "owner@example.com".into(),
            stock_threshold: Some(3),
            telegram_chat_id: Some("99".into()),
            alert_email: Some("alerts@example.com".into()),
            created_at: BsonDateTime::now(),
        });
        store.seed_token(OauthTokenDoc {
            id: ObjectId::new(),
            user_id,
            merchant: 42,
            access_token: "access".into(),
            refresh_token: "refresh".into(),
            expires_in: 3600,
            store_name: Some("My Store".into()),
            store_avatar: None,
            telegram_link_token: None,
            created_at: BsonDateTime::now(),
            updated_at: BsonDateTime::now(),
        });
        store
    }

    #[tokio::test]
    async fn empty_strings_clear_alert_targets() {
        let store = Arc::new(seeded_store());
        let app = app_router(test_state(
            test_config("http://127.0.0.1:1", None),
            store.clone(),
        ));

        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/account/settings")
                    .header("x-user-email", "owner@example.com")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({ "telegram_chat_id": "", "alert_email": "" }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let user = store
            .find_user_by_email("owner@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.telegram_chat_id, None);
        assert_eq!(user.alert_email, None);
        // omitted field stays put
        assert_eq!(user.stock_threshold, Some(3));
    }

    #[tokio::test]
    async fn link_without_a_body_still_issues_a_token() {
        let app = app_router(test_state(
            test_config("http://127.0.0.1:1", None),
            Arc::new(seeded_store()),
        ));

        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/account/telegram/link")
                    .header("x-user-email", "owner@example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["link_token"].as_str().map(str::len), Some(32));
        // no bot configured: no deep link, but the token is still usable
        assert!(body["bot_username"].is_null());
        assert!(body["connect_url"].is_null());
    }

    #[tokio::test]
    async fn missing_identity_header_is_unauthorized() {
        let app = app_router(test_state(
            test_config("http://127.0.0.1:1", None),
            Arc::new(seeded_store()),
        ));

        let resp = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/account/settings")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
