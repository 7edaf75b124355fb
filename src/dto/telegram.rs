use serde::Deserialize;

/// Inbound bot update. Only text messages are acted on; everything else in
/// the update is ignored.
#[derive(Debug, Deserialize)]
pub struct TelegramUpdate {
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    pub chat: Chat,
    pub text: Option<String>,
    pub from: Option<Sender>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct Sender {
    pub first_name: String,
}
