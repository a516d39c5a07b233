//! Bot runtime - polling and webhook runners.

use std::net::SocketAddr;

use teloxide::prelude::*;
use teloxide::update_listeners::webhooks::{self, Options};
use tracing::info;
use url::Url;

use super::dispatcher::ThrottledBot;
use crate::config::{BotMode, Config};

/// Run the bot with the configured mode.
pub async fn run(
    config: &Config,
    mut dispatcher: Dispatcher<ThrottledBot, anyhow::Error, teloxide::dispatching::DefaultKey>,
    bot: ThrottledBot,
) {
    match config.bot_mode {
        BotMode::Polling => {
            info!("Starting bot in polling mode...");
            dispatcher.dispatch().await;
        }
        BotMode::Webhook => {
            info!("Starting bot in webhook mode...");
            run_webhook(config, dispatcher, bot).await;
        }
    }
}

/// Run the bot behind teloxide's axum webhook listener.
///
/// The listener registers the webhook with Telegram on startup and
/// removes it again on shutdown.
async fn run_webhook(
    config: &Config,
    mut dispatcher: Dispatcher<ThrottledBot, anyhow::Error, teloxide::dispatching::DefaultKey>,
    bot: ThrottledBot,
) {
    let webhook_url = config
        .webhook_url
        .as_ref()
        .expect("WEBHOOK_URL must be set when using webhook mode");

    let url = Url::parse(webhook_url).expect("Invalid WEBHOOK_URL format");
    let address = SocketAddr::from(([0, 0, 0, 0], config.webhook_port));

    let mut options = Options::new(address, url.clone());
    if let Some(ref secret) = config.webhook_secret {
        options = options.secret_token(secret.clone());
        info!("Webhook secret token configured");
    }

    info!("Setting webhook URL: {}", url);
    info!("Listening on: {}", address);

    // Webhook setup only needs basic API access, so the inner Bot
    // (without Throttle) is used here.
    let listener = webhooks::axum(bot.inner().clone(), options)
        .await
        .expect("Failed to setup webhook");

    let error_handler = LoggingErrorHandler::with_custom_text("Error from update listener");

    dispatcher
        .dispatch_with_listener(listener, error_handler)
        .await;
}
