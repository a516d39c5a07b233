//! Warden - Telegram group moderation and onboarding bot.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `database` - MongoDB integration (configs, banned terms, warnings)
//! - `cache` - LRU-based caching with Moka
//! - `moderation` - In-memory state: challenges, rate windows, escalation
//! - `permissions` - Admin checking with caching
//! - `bot` - Dispatcher wiring (with Throttle for API rate limiting)
//! - `plugins` - Command handlers
//! - `events` - Join and message event handlers
//! - `health` - Liveness HTTP surface
//! - `utils` - Utility functions

mod bot;
mod cache;
mod config;
mod database;
mod error;
mod events;
mod health;
mod moderation;
mod permissions;
mod plugins;
mod utils;

use std::sync::Arc;

use teloxide::adaptors::throttle::Limits;
use teloxide::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bot::dispatcher::AppState;
use config::Config;
use database::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // Initialize logging with sensible defaults
    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warden=info,teloxide=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Warden bot...");

    // Load configuration
    let config = Config::from_env();
    info!("Configuration loaded successfully");
    info!("Bot mode: {:?}", config.bot_mode);

    // Connect to MongoDB
    info!("Connecting to MongoDB...");
    let db = Database::connect(&config.mongodb_uri, &config.mongodb_database).await?;
    let db = Arc::new(db);
    info!("Database connected");

    // Initialize bot with Throttle for automatic rate limiting
    // This respects Telegram's rate limits:
    // - 30 messages per second globally
    // - 1 message per second to the same chat
    // - 20 messages per minute to the same group
    let bot = Bot::new(&config.bot_token).throttle(Limits::default());
    info!("Bot initialized with rate limiting (Throttle)");

    let me = bot.get_me().await?;
    info!("Bot username: @{}", me.username());

    if config.owner_ids.is_empty() {
        info!("No owner IDs configured (OWNER_IDS is empty)");
    } else {
        info!("Bot owners: {:?}", config.owner_ids);
    }

    // Shared state and cache warmup
    let state = AppState::new(bot.clone(), db, config.owner_ids.clone());

    if let Err(e) = state.configs.warm_cache().await {
        warn!("Failed to preload group configs: {}", e);
    }
    if let Err(e) = state.banned_terms.warm_cache().await {
        warn!("Failed to preload banned terms: {}", e);
    }

    // Liveness surface beside the dispatcher
    let status = health::BotStatus::new();
    health::spawn(config.health_port, status.clone());

    // Build and run the dispatcher
    let dispatcher = bot::build_dispatcher(bot.clone(), state);

    status.set_running(true);
    bot::run(&config, dispatcher, bot).await;
    status.set_running(false);

    Ok(())
}
