pub mod dispatcher;
pub mod linking;
pub mod notifier;
pub mod tokens;
