//! In-memory [`Store`] used by service tests. Counts writes so tests can
//! assert the zero-write paths.

use std::sync::Mutex;

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};

use crate::{
    db::Store,
    errors::AppError,
    models::{
        oauth_token::{OauthGrant, OauthTokenDoc},
        store_telegram::StoreTelegramDoc,
        user::{NewUser, UserDoc, UserSettings},
    },
};

#[derive(Default)]
struct Inner {
    users: Vec<UserDoc>,
    tokens: Vec<OauthTokenDoc>,
    channels: Vec<StoreTelegramDoc>,
    writes: usize,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> usize {
        self.inner.lock().unwrap().writes
    }

    pub fn seed_user(&self, user: UserDoc) {
        self.inner.lock().unwrap().users.push(user);
    }

    pub fn seed_token(&self, token: OauthTokenDoc) {
        self.inner.lock().unwrap().tokens.push(token);
    }

    pub fn seed_channel(&self, channel: StoreTelegramDoc) {
        self.inner.lock().unwrap().channels.push(channel);
    }

    pub fn token_by_id(&self, id: ObjectId) -> Option<OauthTokenDoc> {
        self.inner
            .lock()
            .unwrap()
            .tokens
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    pub fn channels_snapshot(&self) -> Vec<StoreTelegramDoc> {
        self.inner.lock().unwrap().channels.clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserDoc>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: ObjectId) -> Result<Option<UserDoc>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn save_user(&self, data: NewUser) -> Result<ObjectId, AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.writes += 1;
        if let Some(existing) = inner.users.iter_mut().find(|u| u.email == data.email) {
            if existing.salla_id.is_none() {
                existing.salla_id = data.salla_id;
            }
            return Ok(existing.id);
        }
        let user = UserDoc {
            id: ObjectId::new(),
            salla_id: data.salla_id,
            username: data.username,
            email: data.email,
            stock_threshold: None,
            telegram_chat_id: None,
            alert_email: None,
            created_at: BsonDateTime::now(),
        };
        let id = user.id;
        inner.users.push(user);
        Ok(id)
    }

    async fn update_user_settings(
        &self,
        email: &str,
        settings: UserSettings,
    ) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.writes += 1;
        if let Some(user) = inner.users.iter_mut().find(|u| u.email == email) {
            if settings.stock_threshold.is_some() {
                user.stock_threshold = settings.stock_threshold;
            }
            match settings.telegram_chat_id {
                Some(chat_id) if chat_id.is_empty() => user.telegram_chat_id = None,
                Some(chat_id) => user.telegram_chat_id = Some(chat_id),
                None => {}
            }
            match settings.alert_email {
                Some(alert_email) if alert_email.is_empty() => user.alert_email = None,
                Some(alert_email) => user.alert_email = Some(alert_email),
                None => {}
            }
        }
        Ok(())
    }

    async fn find_tokens_for_user(
        &self,
        user_id: ObjectId,
    ) -> Result<Vec<OauthTokenDoc>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut tokens: Vec<OauthTokenDoc> = inner
            .tokens
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        tokens.sort_by_key(|t| t.created_at);
        Ok(tokens)
    }

    async fn find_token_by_merchant(
        &self,
        merchant: i64,
    ) -> Result<Option<OauthTokenDoc>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.tokens.iter().find(|t| t.merchant == merchant).cloned())
    }

    async fn save_oauth(
        &self,
        user_id: ObjectId,
        merchant: i64,
        grant: OauthGrant,
        store_name: Option<String>,
        store_avatar: Option<String>,
    ) -> Result<OauthTokenDoc, AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.writes += 1;
        let now = BsonDateTime::now();
        if let Some(token) = inner
            .tokens
            .iter_mut()
            .find(|t| t.user_id == user_id && t.merchant == merchant)
        {
            token.access_token = grant.access_token;
            token.refresh_token = grant.refresh_token;
            token.expires_in = grant.expires_in;
            if store_name.is_some() {
                token.store_name = store_name;
            }
            if store_avatar.is_some() {
                token.store_avatar = store_avatar;
            }
            token.updated_at = now;
            return Ok(token.clone());
        }
        let token = OauthTokenDoc {
            id: ObjectId::new(),
            user_id,
            merchant,
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expires_in: grant.expires_in,
            store_name,
            store_avatar,
            telegram_link_token: None,
            created_at: now,
            updated_at: now,
        };
        inner.tokens.push(token.clone());
        Ok(token)
    }

    async fn set_link_token(&self, token_id: ObjectId, link_token: &str) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.writes += 1;
        if inner
            .tokens
            .iter()
            .any(|t| t.telegram_link_token.as_deref() == Some(link_token))
        {
            return Err(AppError::Db("duplicate key: telegram_link_token".into()));
        }
        if let Some(token) = inner.tokens.iter_mut().find(|t| t.id == token_id) {
            token.telegram_link_token = Some(link_token.to_string());
        }
        Ok(())
    }

    async fn find_token_by_link_token(
        &self,
        link_token: &str,
    ) -> Result<Option<OauthTokenDoc>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .tokens
            .iter()
            .find(|t| t.telegram_link_token.as_deref() == Some(link_token))
            .cloned())
    }

    async fn add_channel(
        &self,
        oauth_token_id: ObjectId,
        chat_id: &str,
        label: Option<String>,
    ) -> Result<StoreTelegramDoc, AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.writes += 1;
        let channel = StoreTelegramDoc {
            id: ObjectId::new(),
            oauth_token_id,
            chat_id: chat_id.to_string(),
            label,
            created_at: BsonDateTime::now(),
        };
        inner.channels.push(channel.clone());
        Ok(channel)
    }

    async fn remove_channel(
        &self,
        oauth_token_id: ObjectId,
        chat_id: &str,
    ) -> Result<u64, AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.writes += 1;
        let before = inner.channels.len();
        inner
            .channels
            .retain(|c| !(c.oauth_token_id == oauth_token_id && c.chat_id == chat_id));
        Ok((before - inner.channels.len()) as u64)
    }

    async fn list_channels(
        &self,
        oauth_token_id: ObjectId,
    ) -> Result<Vec<StoreTelegramDoc>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut channels: Vec<StoreTelegramDoc> = inner
            .channels
            .iter()
            .filter(|c| c.oauth_token_id == oauth_token_id)
            .cloned()
            .collect();
        channels.sort_by_key(|c| c.created_at);
        Ok(channels)
    }
}
