#[derive(Clone, Debug)]
pub struct Config {
    pub mongodb_uri: String,
    pub db_name: String,

    pub salla_client_id: String,
    pub salla_client_secret: String,
    pub salla_accounts_base: String,
    pub salla_api_base: String,
    pub salla_redirect_uri: Option<String>,
    pub webhook_secret: String,

    pub telegram_bot_token: Option<String>,
    pub telegram_api_base: String,

    pub email_host: Option<String>,
    pub email_port: u16,
    pub email_user: String,
    pub email_pass: String,

    pub default_stock_threshold: i64,
}

impl Config {
    pub fn from_env() -> Self {
        let mongodb_uri = std::env::var("MONGODB_URI").expect("MONGODB_URI is required");
        let db_name = std::env::var("DB_NAME").unwrap_or_else(|_| "salla_alerts".to_string());

        let salla_client_id =
            std::env::var("SALLA_OAUTH_CLIENT_ID").expect("SALLA_OAUTH_CLIENT_ID is required");
        let salla_client_secret = std::env::var("SALLA_OAUTH_CLIENT_SECRET")
            .expect("SALLA_OAUTH_CLIENT_SECRET is required");
        let webhook_secret =
            std::env::var("SALLA_WEBHOOK_SECRET").expect("SALLA_WEBHOOK_SECRET is required");

        let salla_accounts_base = std::env::var("SALLA_ACCOUNTS_BASE")
            .unwrap_or_else(|_| "https://accounts.salla.sa".to_string());
        let salla_api_base = std::env::var("SALLA_API_BASE")
            .unwrap_or_else(|_| "https://api.salla.dev/admin/v2".to_string());
        let salla_redirect_uri = std::env::var("SALLA_OAUTH_CLIENT_REDIRECT_URI")
            .ok()
            .filter(|u| !u.is_empty());

        let telegram_bot_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let telegram_api_base = std::env::var("TELEGRAM_API_BASE")
            .unwrap_or_else(|_| "https://api.telegram.org".to_string());

        let email_host = std::env::var("EMAIL_HOST").ok().filter(|h| !h.is_empty());
        let email_port = std::env::var("EMAIL_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(587);
        let email_user = std::env::var("EMAIL_USER").unwrap_or_default();
        let email_pass = std::env::var("EMAIL_PASS").unwrap_or_default();

        let default_stock_threshold = std::env::var("DEFAULT_STOCK_THRESHOLD")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        Self {
            mongodb_uri,
            db_name,
            salla_client_id,
            salla_client_secret,
            salla_accounts_base,
            salla_api_base,
            salla_redirect_uri,
            webhook_secret,
            telegram_bot_token,
            telegram_api_base,
            email_host,
            email_port,
            email_user,
            email_pass,
            default_stock_threshold,
        }
    }
}
