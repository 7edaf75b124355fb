use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDoc {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    /// Merchant account id on the Salla platform; unique when present.
    pub salla_id: Option<i64>,
    pub username: String,
    pub email: String,

    /// Alert when product quantity drops to this value or below.
    pub stock_threshold: Option<i64>,
    /// Legacy single-recipient chat id, kept alongside per-store channels.
    pub telegram_chat_id: Option<String>,
    pub alert_email: Option<String>,

    pub created_at: BsonDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserPublic {
    pub id: String,
    pub email: String,
    pub username: String,
    pub stock_threshold: Option<i64>,
    pub telegram_chat_id: Option<String>,
    pub alert_email: Option<String>,
}

impl From<UserDoc> for UserPublic {
    fn from(u: UserDoc) -> Self {
        Self {
            id: u.id.to_hex(),
            email: u.email,
            username: u.username,
            stock_threshold: u.stock_threshold,
            telegram_chat_id: u.telegram_chat_id,
            alert_email: u.alert_email,
        }
    }
}

/// Profile data persisted on first successful authorization.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub salla_id: Option<i64>,
    pub username: String,
    pub email: String,
}

/// Merchant-editable alert settings.
#[derive(Debug, Clone, Default)]
pub struct UserSettings {
    pub stock_threshold: Option<i64>,
    pub telegram_chat_id: Option<String>,
    pub alert_email: Option<String>,
}
