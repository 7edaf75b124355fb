pub mod account;
pub mod api;
pub mod oauth;
pub mod telegram;
pub mod webhook;
