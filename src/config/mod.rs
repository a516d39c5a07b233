//! Configuration module.
//!
//! Loads configuration from environment variables.

use std::env;

/// Bot running mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotMode {
    Polling,
    Webhook,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub bot_token: String,
    pub bot_mode: BotMode,
    pub webhook_url: Option<String>,
    pub webhook_port: u16,
    pub webhook_secret: Option<String>,

    /// Owner user IDs (comma-separated).
    /// These users bypass all permission checks.
    pub owner_ids: Vec<u64>,

    // MongoDB
    pub mongodb_uri: String,
    pub mongodb_database: String,

    /// Port for the liveness/status HTTP server.
    pub health_port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if required environment variables are not set.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let bot_mode = match env::var("BOT_MODE")
            .unwrap_or_else(|_| "polling".to_string())
            .to_lowercase()
            .as_str()
        {
            "webhook" => BotMode::Webhook,
            _ => BotMode::Polling,
        };

        let webhook_url = env::var("WEBHOOK_URL").ok();

        if bot_mode == BotMode::Webhook && webhook_url.is_none() {
            panic!("WEBHOOK_URL must be set when BOT_MODE is webhook");
        }

        let webhook_port = env::var("WEBHOOK_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8443);

        let webhook_secret = env::var("WEBHOOK_SECRET").ok().filter(|s| !s.is_empty());

        let owner_ids = env::var("OWNER_IDS")
            .unwrap_or_default()
            .split(',')
            .filter_map(|s| s.trim().parse::<u64>().ok())
            .collect();

        let health_port = env::var("HEALTH_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        Self {
            bot_token: env::var("BOT_TOKEN").expect("BOT_TOKEN must be set"),
            bot_mode,
            webhook_url,
            webhook_port,
            webhook_secret,
            owner_ids,
            mongodb_uri: env::var("MONGODB_URI").expect("MONGODB_URI must be set"),
            mongodb_database: env::var("MONGODB_DATABASE")
                .unwrap_or_else(|_| "warden".to_string()),
            health_port,
        }
    }
}
