use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// One document per (user, merchant) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OauthTokenDoc {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub user_id: ObjectId,
    pub merchant: i64,

    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,

    #[serde(default)]
    pub store_name: Option<String>,
    #[serde(default)]
    pub store_avatar: Option<String>,

    /// Store-level invite code for Telegram linking; unique across all
    /// stores. Absent (not null) until issued, so the sparse unique index
    /// skips unlinked stores.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram_link_token: Option<String>,

    pub created_at: BsonDateTime,
    /// Set on every refresh; expiry is computed from this, never stored.
    pub updated_at: BsonDateTime,
}

impl OauthTokenDoc {
    pub fn store_label(&self) -> &str {
        self.store_name.as_deref().unwrap_or("Salla Store")
    }
}

/// Token material returned by the provider, persisted via upsert.
#[derive(Debug, Clone, Deserialize)]
pub struct OauthGrant {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StorePublic {
    pub id: String,
    pub merchant: i64,
    pub store_name: Option<String>,
    pub store_avatar: Option<String>,
}

impl From<&OauthTokenDoc> for StorePublic {
    fn from(t: &OauthTokenDoc) -> Self {
        Self {
            id: t.id.to_hex(),
            merchant: t.merchant,
            store_name: t.store_name.clone(),
            store_avatar: t.store_avatar.clone(),
        }
    }
}
