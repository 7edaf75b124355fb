use serde::Deserialize;

/// Envelope Salla posts to the webhook endpoint.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    pub merchant: i64,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// The slice of `product.updated` payloads the dispatcher cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductPayload {
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    pub quantity: i64,
}
