use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// A Telegram chat bound to a store. Nothing enforces uniqueness on
/// (oauth_token_id, chat_id); duplicate bindings are legal and fan-out
/// delivers once per row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreTelegramDoc {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub oauth_token_id: ObjectId,
    pub chat_id: String,
    pub label: Option<String>,

    pub created_at: BsonDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelPublic {
    pub chat_id: String,
    pub label: Option<String>,
}

impl From<&StoreTelegramDoc> for ChannelPublic {
    fn from(c: &StoreTelegramDoc) -> Self {
        Self {
            chat_id: c.chat_id.clone(),
            label: c.label.clone(),
        }
    }
}
