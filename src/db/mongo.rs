use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime as BsonDateTime},
    options::{ClientOptions, IndexOptions, ReturnDocument},
    Client, Collection, IndexModel,
};

use crate::{
    config::Config,
    db::Store,
    errors::AppError,
    models::{
        oauth_token::{OauthGrant, OauthTokenDoc},
        store_telegram::StoreTelegramDoc,
        user::{NewUser, UserDoc, UserSettings},
    },
};

pub struct MongoStore {
    users: Collection<UserDoc>,
    oauth_tokens: Collection<OauthTokenDoc>,
    store_telegrams: Collection<StoreTelegramDoc>,
}

impl MongoStore {
    /// Connects and creates the unique indexes the data contracts rely on.
    /// A failure here aborts startup; after that the driver's pool handles
    /// reconnection on its own.
    pub async fn connect(cfg: &Config) -> mongodb::error::Result<Self> {
        let mut opts = ClientOptions::parse(&cfg.mongodb_uri).await?;
        opts.app_name = Some("salla-stock-alerts".to_string());
        let client = Client::with_options(opts)?;
        let db = client.database(&cfg.db_name);

        let users: Collection<UserDoc> = db.collection("users");
        let oauth_tokens: Collection<OauthTokenDoc> = db.collection("oauth_tokens");
        let store_telegrams: Collection<StoreTelegramDoc> = db.collection("store_telegrams");

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        let _ = users.create_index(email_index).await?;

        // at most one token record per (user, merchant)
        let pair_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "merchant": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        let _ = oauth_tokens.create_index(pair_index).await?;

        // a link token must resolve to exactly one store
        let link_index = IndexModel::builder()
            .keys(doc! { "telegram_link_token": 1 })
            .options(IndexOptions::builder().unique(true).sparse(true).build())
            .build();
        let _ = oauth_tokens.create_index(link_index).await?;

        let channel_index = IndexModel::builder()
            .keys(doc! { "oauth_token_id": 1 })
            .build();
        let _ = store_telegrams.create_index(channel_index).await?;

        Ok(Self {
            users,
            oauth_tokens,
            store_telegrams,
        })
    }
}

#[async_trait]
impl Store for MongoStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserDoc>, AppError> {
        Ok(self.users.find_one(doc! { "email": email }).await?)
    }

    async fn find_user_by_id(&self, id: ObjectId) -> Result<Option<UserDoc>, AppError> {
        Ok(self.users.find_one(doc! { "_id": id }).await?)
    }

    async fn save_user(&self, data: NewUser) -> Result<ObjectId, AppError> {
        if let Some(existing) = self.users.find_one(doc! { "email": &data.email }).await? {
            if existing.salla_id.is_none() {
                if let Some(salla_id) = data.salla_id {
                    self.users
                        .update_one(
                            doc! { "_id": existing.id },
                            doc! { "$set": { "salla_id": salla_id } },
                        )
                        .await?;
                }
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
        self.users.insert_one(&user).await?;
        Ok(user.id)
    }

    async fn update_user_settings(
        &self,
        email: &str,
        settings: UserSettings,
    ) -> Result<(), AppError> {
        let mut set = doc! {};
        let mut unset = doc! {};
        if let Some(threshold) = settings.stock_threshold {
            set.insert("stock_threshold", threshold);
        }
        match settings.telegram_chat_id {
            Some(chat_id) if chat_id.is_empty() => {
                unset.insert("telegram_chat_id", "");
            }
            Some(chat_id) => {
                set.insert("telegram_chat_id", chat_id);
            }
            None => {}
        }
        match settings.alert_email {
            Some(alert_email) if alert_email.is_empty() => {
                unset.insert("alert_email", "");
            }
            Some(alert_email) => {
                set.insert("alert_email", alert_email);
            }
            None => {}
        }

        let mut update = doc! {};
        if !set.is_empty() {
            update.insert("$set", set);
        }
        if !unset.is_empty() {
            update.insert("$unset", unset);
        }
        if update.is_empty() {
            return Ok(());
        }

        self.users.update_one(doc! { "email": email }, update).await?;
        Ok(())
    }

    async fn find_tokens_for_user(
        &self,
        user_id: ObjectId,
    ) -> Result<Vec<OauthTokenDoc>, AppError> {
        let tokens = self
            .oauth_tokens
            .find(doc! { "user_id": user_id })
            .sort(doc! { "created_at": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(tokens)
    }

    async fn find_token_by_merchant(
        &self,
        merchant: i64,
    ) -> Result<Option<OauthTokenDoc>, AppError> {
        Ok(self
            .oauth_tokens
            .find_one(doc! { "merchant": merchant })
            .await?)
    }

    async fn save_oauth(
        &self,
        user_id: ObjectId,
        merchant: i64,
        grant: OauthGrant,
        store_name: Option<String>,
        store_avatar: Option<String>,
    ) -> Result<OauthTokenDoc, AppError> {
        let now = BsonDateTime::now();
        let mut set = doc! {
            "access_token": &grant.access_token,
            "refresh_token": &grant.refresh_token,
            "expires_in": grant.expires_in,
            "updated_at": now,
        };
        if let Some(name) = store_name {
            set.insert("store_name", name);
        }
        if let Some(avatar) = store_avatar {
            set.insert("store_avatar", avatar);
        }

        let updated = self
            .oauth_tokens
            .find_one_and_update(
                doc! { "user_id": user_id, "merchant": merchant },
                doc! {
                    "$set": set,
                    "$setOnInsert": { "created_at": now },
                },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?;

        updated.ok_or_else(|| AppError::Db("upsert returned no document".into()))
    }

    async fn set_link_token(&self, token_id: ObjectId, link_token: &str) -> Result<(), AppError> {
        self.oauth_tokens
            .update_one(
                doc! { "_id": token_id },
                doc! { "$set": { "telegram_link_token": link_token } },
            )
            .await?;
        Ok(())
    }

    async fn find_token_by_link_token(
        &self,
        link_token: &str,
    ) -> Result<Option<OauthTokenDoc>, AppError> {
        Ok(self
            .oauth_tokens
            .find_one(doc! { "telegram_link_token": link_token })
            .await?)
    }

    async fn add_channel(
        &self,
        oauth_token_id: ObjectId,
        chat_id: &str,
        label: Option<String>,
    ) -> Result<StoreTelegramDoc, AppError> {
        let channel = StoreTelegramDoc {
            id: ObjectId::new(),
            oauth_token_id,
            chat_id: chat_id.to_string(),
            label,
            created_at: BsonDateTime::now(),
        };
        self.store_telegrams.insert_one(&channel).await?;
        Ok(channel)
    }

    async fn remove_channel(
        &self,
        oauth_token_id: ObjectId,
        chat_id: &str,
    ) -> Result<u64, AppError> {
        let result = self
            .store_telegrams
            .delete_many(doc! { "oauth_token_id": oauth_token_id, "chat_id": chat_id })
            .await?;
        Ok(result.deleted_count)
    }

    async fn list_channels(
        &self,
        oauth_token_id: ObjectId,
    ) -> Result<Vec<StoreTelegramDoc>, AppError> {
        let channels = self
            .store_telegrams
            .find(doc! { "oauth_token_id": oauth_token_id })
            .sort(doc! { "created_at": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(channels)
    }
}
