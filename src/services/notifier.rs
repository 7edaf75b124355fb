use futures_util::future::join_all;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{error, info, warn};

use crate::{config::Config, errors::AppError, telegram::TelegramClient};

#[derive(Clone)]
struct SmtpSettings {
    host: String,
    port: u16,
    user: String,
    pass: String,
}

/// Fan-out engine: pushes one message to every channel of a store and,
/// independently, to the user's legacy alert email.
pub struct Notifier {
    telegram: TelegramClient,
    smtp: Option<SmtpSettings>,
}

impl Notifier {
    pub fn new(cfg: &Config) -> Self {
        let smtp = cfg.email_host.as_ref().map(|host| SmtpSettings {
            host: host.clone(),
            port: cfg.email_port,
            user: cfg.email_user.clone(),
            pass: cfg.email_pass.clone(),
        });
        Self {
            telegram: TelegramClient::new(cfg),
            smtp,
        }
    }

    pub fn telegram(&self) -> &TelegramClient {
        &self.telegram
    }

    /// Sends to a single chat, logging a delivery failure instead of
    /// raising it.
    pub async fn send_telegram_alert(&self, chat_id: &str, message: &str) {
        if let Err(e) = self.telegram.send_message(chat_id, message).await {
            error!(chat_id, "telegram delivery failed: {e}");
        }
    }

    /// Delivers `message` to every chat id, all sends in flight at once,
    /// waiting until each has settled. One failing chat never blocks the
    /// rest. Duplicate ids in the slice get duplicate deliveries; the list
    /// is taken row-by-row, not deduplicated here.
    pub async fn broadcast_to_store(&self, chat_ids: &[String], message: &str, store_name: &str) {
        if chat_ids.is_empty() {
            return;
        }
        if !self.telegram.is_configured() {
            warn!("telegram bot token missing, skipping broadcast");
            return;
        }

        let full_message = if store_name.is_empty() {
            message.to_string()
        } else {
            format!("🏪 <b>[{store_name}]</b>\n{message}")
        };

        let sends = chat_ids
            .iter()
            .map(|chat_id| self.send_telegram_alert(chat_id, &full_message));
        join_all(sends).await;
    }

    /// Emails the alert; absent SMTP configuration is a skip with a
    /// warning, and a transport failure is logged, never raised.
    pub async fn send_email_alert(&self, address: &str, message: &str) {
        let Some(smtp) = self.smtp.clone() else {
            warn!("SMTP settings missing, skipping email alert");
            return;
        };

        match send_email(&smtp, address, message).await {
            Ok(()) => info!(address, "email alert sent"),
            Err(e) => error!(address, "email delivery failed: {e}"),
        }
    }
}

async fn send_email(smtp: &SmtpSettings, address: &str, message: &str) -> Result<(), AppError> {
    let from = format!("Salla Alerts <{}>", smtp.user)
        .parse()
        .map_err(|e| AppError::Internal(format!("bad sender address: {e}")))?;
    let to = address
        .parse()
        .map_err(|e| AppError::Internal(format!("bad recipient address: {e}")))?;

    let email = Message::builder()
        .from(from)
        .to(to)
        .subject("Low Stock Alert! ⚠️")
        .header(ContentType::TEXT_HTML)
        .body(format!("<p>{message}</p>"))
        .map_err(|e| AppError::Internal(format!("build email: {e}")))?;

    let builder = if smtp.port == 465 {
        AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
    }
    .map_err(|e| AppError::Internal(format!("smtp transport: {e}")))?;

    let mailer = builder
        .port(smtp.port)
        .credentials(Credentials::new(smtp.user.clone(), smtp.pass.clone()))
        .build();

    mailer
        .send(email)
        .await
        .map_err(|e| AppError::Upstream(format!("smtp send: {e}")))?;
    Ok(())
}
