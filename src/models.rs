pub mod oauth_token;
pub mod store_telegram;
pub mod user;
