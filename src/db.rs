use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::{
    errors::AppError,
    models::{
        oauth_token::{OauthGrant, OauthTokenDoc},
        store_telegram::StoreTelegramDoc,
        user::{NewUser, UserDoc, UserSettings},
    },
};

pub mod mongo;

#[cfg(test)]
pub mod memory;

/// Persistence port. One concrete backend is chosen at startup; the core
/// logic never branches on backend identity.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserDoc>, AppError>;

    async fn find_user_by_id(&self, id: ObjectId) -> Result<Option<UserDoc>, AppError>;

    /// Upsert by email; returns the user's id. An existing user keeps its
    /// settings, only a missing `salla_id` is backfilled.
    async fn save_user(&self, data: NewUser) -> Result<ObjectId, AppError>;

    /// `None` leaves a field unchanged; an empty string clears the stored
    /// value for the two alert targets.
    async fn update_user_settings(
        &self,
        email: &str,
        settings: UserSettings,
    ) -> Result<(), AppError>;

    /// All token records for a user, creation order ascending. The first
    /// element is the default store when a caller names no merchant.
    async fn find_tokens_for_user(&self, user_id: ObjectId)
        -> Result<Vec<OauthTokenDoc>, AppError>;

    async fn find_token_by_merchant(
        &self,
        merchant: i64,
    ) -> Result<Option<OauthTokenDoc>, AppError>;

    /// Upsert scoped to (user_id, merchant); never creates a duplicate pair.
    /// Refreshes `updated_at`; `created_at` is set on insert only.
    async fn save_oauth(
        &self,
        user_id: ObjectId,
        merchant: i64,
        grant: OauthGrant,
        store_name: Option<String>,
        store_avatar: Option<String>,
    ) -> Result<OauthTokenDoc, AppError>;

    async fn set_link_token(&self, token_id: ObjectId, link_token: &str) -> Result<(), AppError>;

    /// Exact-match lookup; a link token resolves any number of times.
    async fn find_token_by_link_token(
        &self,
        link_token: &str,
    ) -> Result<Option<OauthTokenDoc>, AppError>;

    async fn add_channel(
        &self,
        oauth_token_id: ObjectId,
        chat_id: &str,
        label: Option<String>,
    ) -> Result<StoreTelegramDoc, AppError>;

    /// Deletes every row matching both fields; zero matches is not an error.
    async fn remove_channel(&self, oauth_token_id: ObjectId, chat_id: &str)
        -> Result<u64, AppError>;

    async fn list_channels(
        &self,
        oauth_token_id: ObjectId,
    ) -> Result<Vec<StoreTelegramDoc>, AppError>;
}
