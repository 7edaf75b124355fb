pub mod account;
pub mod telegram;
pub mod webhook;
