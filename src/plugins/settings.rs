//! Group settings commands.

use teloxide::prelude::*;
use teloxide::types::{ParseMode, ReplyParameters};
use tracing::{info, warn};

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::database::models::GroupConfig;
use crate::error::BotError;

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on ✅" } else { "off ❌" }
}

/// Admin gate shared by all settings commands.
async fn require_admin(
    bot: &ThrottledBot,
    msg: &Message,
    state: &AppState,
) -> anyhow::Result<bool> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(false);
    };

    if !msg.chat.is_group() && !msg.chat.is_supergroup() {
        return Ok(false);
    }

    if !state.permissions.is_admin(msg.chat.id, user.id).await.unwrap_or(false) {
        bot.send_message(msg.chat.id, BotError::Permission.user_message())
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(false);
    }

    Ok(true)
}

async fn load_config(
    bot: &ThrottledBot,
    msg: &Message,
    state: &AppState,
) -> anyhow::Result<Option<GroupConfig>> {
    match state.configs.get_or_default(msg.chat.id.0).await {
        Ok(c) => Ok(Some(c)),
        Err(e) => {
            warn!("Config lookup failed for chat {}: {}", msg.chat.id, e);
            bot.send_message(msg.chat.id, e.user_message())
                .await?;
            Ok(None)
        }
    }
}

/// Handle /settings - settings overview.
pub async fn settings_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    if !require_admin(&bot, &msg, &state).await? {
        return Ok(());
    }
    let Some(config) = load_config(&bot, &msg, &state).await? else {
        return Ok(());
    };

    let text = format!(
        "⚙️ <b>Group settings</b>\n\n\
         Welcome message: {}\n\
         Custom welcome text: {}\n\
         Welcome media: {}\n\
         Rules set: {}\n\
         Antispam: {}\n\
         Join CAPTCHA: {}\n\
         Max warnings: {}\n\
         Security level: {}",
        on_off(config.welcome_enabled),
        if config.welcome_template.is_some() { "yes" } else { "default" },
        if config.welcome_media.is_some() { "yes" } else { "none" },
        if config.rules_text.is_some() { "yes" } else { "no" },
        on_off(config.antispam_enabled),
        on_off(config.captcha_enabled),
        config.max_warnings,
        config.security_level,
    );

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;

    Ok(())
}

/// Handle /security - security overview.
pub async fn security_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    if !require_admin(&bot, &msg, &state).await? {
        return Ok(());
    }
    let Some(config) = load_config(&bot, &msg, &state).await? else {
        return Ok(());
    };

    let text = format!(
        "🛡 <b>Security overview</b>\n\n\
         Security level: {}\n\
         Antispam: {}\n\
         Join CAPTCHA: {}\n\
         Warnings before ban: {}\n\n\
         Toggle with /antispam and /captcha.",
        config.security_level,
        on_off(config.antispam_enabled),
        on_off(config.captcha_enabled),
        config.max_warnings,
    );

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;

    Ok(())
}

/// Handle /antispam - toggle message-rate spam detection.
pub async fn antispam_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    if !require_admin(&bot, &msg, &state).await? {
        return Ok(());
    }
    let Some(mut config) = load_config(&bot, &msg, &state).await? else {
        return Ok(());
    };

    config.antispam_enabled = !config.antispam_enabled;

    if let Err(e) = state.configs.save(&config).await {
        warn!("Config save failed for chat {}: {}", msg.chat.id, e);
        bot.send_message(msg.chat.id, e.user_message())
            .await?;
        return Ok(());
    }

    info!(
        "Antispam toggled to {} in chat {}",
        config.antispam_enabled, msg.chat.id
    );
    bot.send_message(
        msg.chat.id,
        format!("🚦 Antispam is now {}.", on_off(config.antispam_enabled)),
    )
    .await?;

    Ok(())
}

/// Handle /captcha - toggle the join CAPTCHA.
pub async fn captcha_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    if !require_admin(&bot, &msg, &state).await? {
        return Ok(());
    }
    let Some(mut config) = load_config(&bot, &msg, &state).await? else {
        return Ok(());
    };

    config.captcha_enabled = !config.captcha_enabled;

    if let Err(e) = state.configs.save(&config).await {
        warn!("Config save failed for chat {}: {}", msg.chat.id, e);
        bot.send_message(msg.chat.id, e.user_message())
            .await?;
        return Ok(());
    }

    info!(
        "Captcha toggled to {} in chat {}",
        config.captcha_enabled, msg.chat.id
    );
    bot.send_message(
        msg.chat.id,
        format!("🔐 Join CAPTCHA is now {}.", on_off(config.captcha_enabled)),
    )
    .await?;

    Ok(())
}
